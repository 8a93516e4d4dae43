//! Courseflow - Courseware Progress Engine
//!
//! Courseflow recomputes derived student state whenever an evaluation event
//! arrives: leaf and ancestor completion, competency mastery over the
//! document-item graph, score rollups along the ancestry chain, and the
//! attempt a student's next interaction should run under.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): value types, ledger and transport ports
//! - **Service Layer** (`services`): the recomputations and the dispatcher
//! - **Application Layer** (`application`): engine wiring and lifecycle
//! - **Infrastructure Layer** (`infrastructure`): `SQLite` ledgers, config
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use courseflow::application::Engine;
//! use courseflow::domain::models::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = Engine::start(&Config::default()).await?;
//!     // engine.dispatcher().handle(&event).await?;
//!     engine.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::Engine;
pub use domain::models::{
    Attempt, Completion, Config, CoursewareElement, ElementType, EvaluationAction,
    EvaluationEvent, PathwayType, Progress,
};
pub use domain::{DomainError, DomainResult};
pub use services::{EvaluationDispatcher, EvaluationOutcome};
