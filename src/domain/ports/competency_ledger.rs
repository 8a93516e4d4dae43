use crate::domain::models::CompetencyMet;
use crate::domain::ports::errors::LedgerError;
use async_trait::async_trait;
use uuid::Uuid;

/// Ledger port for competency-met records.
///
/// Append-only; the latest record for (student, document, item) wins. A
/// missing record reads as "no mastery evidence yet" and is ordinary
/// control flow for the aggregator.
#[async_trait]
pub trait CompetencyLedger: Send + Sync {
    /// Latest record for (student, document, item).
    async fn find_latest(
        &self,
        student_id: Uuid,
        document_id: Uuid,
        document_item_id: Uuid,
    ) -> Result<Option<CompetencyMet>, LedgerError>;

    /// Append a new competency-met record.
    async fn insert(&self, record: &CompetencyMet) -> Result<(), LedgerError>;
}
