//! Domain errors for the Courseflow engine.

use thiserror::Error;
use uuid::Uuid;

/// Format a cycle path as a human-readable string: `A -> B -> C -> A`.
fn format_cycle_path(path: &[Uuid]) -> String {
    path.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Domain-level errors.
///
/// Expected absences ("no progress yet") are not errors: the ledger ports
/// return `Ok(None)` and callers treat that as ordinary control flow. The
/// variants here are either bad input (fatal to the operation, never
/// retried) or violated invariants (fatal, aborts the chain).
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Ancestry list is empty")]
    EmptyAncestry,

    #[error("Ancestry head {head} does not match evaluated element {evaluated}")]
    AncestryMismatch { head: Uuid, evaluated: Uuid },

    #[error("Element {0} is not a pathway or carries no pathway type")]
    MissingPathwayType(Uuid),

    #[error("No attempt resolver registered for pathway type: {0}")]
    UnknownPathwayType(String),

    #[error("Attempt value must be >= 1, got {0}")]
    InvalidAttemptValue(u32),

    #[error("Propagation position {position} is out of range for ancestry of length {len}")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("Competency association cycle detected: {}", format_cycle_path(.0))]
    AssociationCycle(Vec<Uuid>),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
