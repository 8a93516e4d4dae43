use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use crate::domain::models::ScopeEntry;
use crate::domain::ports::errors::LedgerError;
use crate::domain::ports::scope_ledger::ScopeLedger;
use crate::infrastructure::database::utils::format_datetime;

/// SQLite implementation of `ScopeLedger` using sqlx
///
/// Write-only from the engine's side; scoped data is read by downstream
/// consumers, not by the recomputations.
pub struct ScopeLedgerImpl {
    pool: SqlitePool,
}

impl ScopeLedgerImpl {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScopeLedger for ScopeLedgerImpl {
    async fn insert(&self, entry: &ScopeEntry) -> Result<(), LedgerError> {
        sqlx::query(
            r"
            INSERT INTO scope_entries (id, deployment_id, student_id, scope_url, source_id, data, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(entry.id.to_string())
        .bind(entry.deployment_id.to_string())
        .bind(entry.student_id.to_string())
        .bind(entry.scope_url.as_str())
        .bind(entry.source_id.to_string())
        .bind(serde_json::to_string(&entry.data)?)
        .bind(format_datetime(&entry.created_at))
        .execute(&self.pool)
        .await?;

        debug!(entry = %entry.id, scope = %entry.scope_url, "scope entry appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::connection::DatabaseConnection;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn appends_scope_entries() {
        let db = DatabaseConnection::new("sqlite::memory:", 2)
            .await
            .expect("connection");
        db.migrate().await.expect("migrations");
        let ledger = ScopeLedgerImpl::new(db.pool().clone());

        let entry = ScopeEntry::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "https://scopes.example/notes".to_string(),
            Uuid::new_v4(),
            json!({"highlight": "page 3"}),
        );
        ledger.insert(&entry).await.unwrap();
        ledger
            .insert(&ScopeEntry::new(
                entry.deployment_id,
                entry.student_id,
                entry.scope_url.clone(),
                entry.source_id,
                json!({"highlight": "page 4"}),
            ))
            .await
            .unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scope_entries")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 2);
    }
}
