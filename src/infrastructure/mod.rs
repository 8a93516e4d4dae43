//! Infrastructure layer: adapters behind the domain ports
//!
//! - `config`: figment-based configuration loading
//! - `database`: SQLite ledger implementations

pub mod config;
pub mod database;
