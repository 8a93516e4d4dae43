use crate::domain::models::ScoreEntry;
use crate::domain::ports::errors::LedgerError;
use async_trait::async_trait;
use uuid::Uuid;

/// Ledger port for score entries.
///
/// Append-only; the latest entry for (deployment, element, student) is the
/// element's current aggregate.
#[async_trait]
pub trait ScoreLedger: Send + Sync {
    /// Latest entry for (deployment, element, student).
    async fn find_latest(
        &self,
        deployment_id: Uuid,
        element_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<ScoreEntry>, LedgerError>;

    /// Append a new score entry.
    async fn insert(&self, entry: &ScoreEntry) -> Result<(), LedgerError>;
}
