use crate::domain::models::ScopeEntry;
use crate::domain::ports::errors::LedgerError;
use async_trait::async_trait;

/// Ledger port for scoped student data written by CHANGE_SCOPE actions.
#[async_trait]
pub trait ScopeLedger: Send + Sync {
    /// Append a new scope entry.
    async fn insert(&self, entry: &ScopeEntry) -> Result<(), LedgerError>;
}
