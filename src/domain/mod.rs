//! Domain layer for the Courseflow progress engine.
//!
//! This module contains the core value types and the port contracts the
//! engine consumes.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
