use crate::domain::models::Progress;
use crate::domain::ports::errors::LedgerError;
use async_trait::async_trait;
use uuid::Uuid;

/// Ledger port for progress records.
///
/// Append-only; the latest record for (deployment, element, student) wins.
#[async_trait]
pub trait ProgressLedger: Send + Sync {
    /// Latest progress for (deployment, element, student).
    async fn find_latest(
        &self,
        deployment_id: Uuid,
        element_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Progress>, LedgerError>;

    /// Append a new progress record.
    async fn insert(&self, progress: &Progress) -> Result<(), LedgerError>;
}
