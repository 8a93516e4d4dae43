use crate::domain::models::Attempt;
use crate::domain::ports::errors::LedgerError;
use async_trait::async_trait;
use uuid::Uuid;

/// Ledger port for attempt records.
///
/// The store is append-only: attempts are inserted once and never mutated
/// or deleted. "No attempt yet" is an ordinary `Ok(None)`, not an error.
#[async_trait]
pub trait AttemptLedger: Send + Sync {
    /// Latest attempt for (deployment, element, student), newest first.
    async fn find_latest(
        &self,
        deployment_id: Uuid,
        element_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Attempt>, LedgerError>;

    /// Append a new attempt.
    async fn insert(&self, attempt: &Attempt) -> Result<(), LedgerError>;
}
