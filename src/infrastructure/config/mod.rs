//! Configuration loading
//!
//! Figment-based hierarchical configuration: programmatic defaults, project
//! YAML files, then `COURSEFLOW_*` environment variables.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
