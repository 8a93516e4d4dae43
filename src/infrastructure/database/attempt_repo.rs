use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::domain::models::Attempt;
use crate::domain::ports::attempt_ledger::AttemptLedger;
use crate::domain::ports::errors::LedgerError;
use crate::infrastructure::database::utils::{format_datetime, parse_datetime};

/// SQLite implementation of `AttemptLedger` using sqlx
pub struct AttemptLedgerImpl {
    pool: SqlitePool,
}

impl AttemptLedgerImpl {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_attempt(row: &sqlx::sqlite::SqliteRow) -> Result<Attempt, LedgerError> {
        use sqlx::Row;

        Ok(Attempt {
            id: Uuid::parse_str(row.get::<String, _>("id").as_str())?,
            parent_id: row
                .get::<Option<String>, _>("parent_id")
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()?,
            deployment_id: Uuid::parse_str(row.get::<String, _>("deployment_id").as_str())?,
            student_id: Uuid::parse_str(row.get::<String, _>("student_id").as_str())?,
            element_id: Uuid::parse_str(row.get::<String, _>("element_id").as_str())?,
            element_type: row
                .get::<String, _>("element_type")
                .parse()
                .map_err(LedgerError::InvalidValue)?,
            value: u32::try_from(row.get::<i64, _>("value"))
                .map_err(|e| LedgerError::InvalidValue(e.to_string()))?,
            created_at: parse_datetime(row.get::<String, _>("created_at").as_str())?,
        })
    }
}

#[async_trait]
impl AttemptLedger for AttemptLedgerImpl {
    async fn find_latest(
        &self,
        deployment_id: Uuid,
        element_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Attempt>, LedgerError> {
        let row = sqlx::query(
            r"
            SELECT id, parent_id, deployment_id, student_id, element_id, element_type, value, created_at
            FROM attempts
            WHERE deployment_id = ? AND element_id = ? AND student_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(deployment_id.to_string())
        .bind(element_id.to_string())
        .bind(student_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_attempt).transpose()
    }

    async fn insert(&self, attempt: &Attempt) -> Result<(), LedgerError> {
        sqlx::query(
            r"
            INSERT INTO attempts (id, parent_id, deployment_id, student_id, element_id, element_type, value, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(attempt.id.to_string())
        .bind(attempt.parent_id.map(|id| id.to_string()))
        .bind(attempt.deployment_id.to_string())
        .bind(attempt.student_id.to_string())
        .bind(attempt.element_id.to_string())
        .bind(attempt.element_type.as_str())
        .bind(i64::from(attempt.value))
        .bind(format_datetime(&attempt.created_at))
        .execute(&self.pool)
        .await?;

        debug!(attempt = %attempt.id, element = %attempt.element_id, "attempt appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ElementType;
    use crate::infrastructure::database::connection::DatabaseConnection;

    async fn ledger() -> AttemptLedgerImpl {
        let db = DatabaseConnection::new("sqlite::memory:", 2)
            .await
            .expect("connection");
        db.migrate().await.expect("migrations");
        AttemptLedgerImpl::new(db.pool().clone())
    }

    #[tokio::test]
    async fn find_latest_on_empty_ledger_is_none() {
        let ledger = ledger().await;
        let found = ledger
            .find_latest(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn latest_attempt_wins() {
        let ledger = ledger().await;
        let first = Attempt::first(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            ElementType::Interactive,
        );
        let second = first.successor(Uuid::new_v4(), 2);

        ledger.insert(&first).await.unwrap();
        ledger.insert(&second).await.unwrap();

        let found = ledger
            .find_latest(first.deployment_id, first.element_id, first.student_id)
            .await
            .unwrap()
            .expect("latest attempt");
        assert_eq!(found.id, second.id);
        assert_eq!(found.value, 2);
        assert_eq!(found.parent_id, second.parent_id);
    }
}
