use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::domain::models::ScoreEntry;
use crate::domain::ports::errors::LedgerError;
use crate::domain::ports::score_ledger::ScoreLedger;
use crate::infrastructure::database::utils::{format_datetime, parse_datetime};

/// SQLite implementation of `ScoreLedger` using sqlx
pub struct ScoreLedgerImpl {
    pool: SqlitePool,
}

impl ScoreLedgerImpl {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<ScoreEntry, LedgerError> {
        use sqlx::Row;

        Ok(ScoreEntry {
            id: Uuid::parse_str(row.get::<String, _>("id").as_str())?,
            deployment_id: Uuid::parse_str(row.get::<String, _>("deployment_id").as_str())?,
            change_id: Uuid::parse_str(row.get::<String, _>("change_id").as_str())?,
            element_id: Uuid::parse_str(row.get::<String, _>("element_id").as_str())?,
            element_type: row
                .get::<String, _>("element_type")
                .parse()
                .map_err(LedgerError::InvalidValue)?,
            student_id: Uuid::parse_str(row.get::<String, _>("student_id").as_str())?,
            attempt_id: Uuid::parse_str(row.get::<String, _>("attempt_id").as_str())?,
            evaluation_id: row
                .get::<Option<String>, _>("evaluation_id")
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()?,
            value: row.get::<f64, _>("value"),
            created_at: parse_datetime(row.get::<String, _>("created_at").as_str())?,
        })
    }
}

#[async_trait]
impl ScoreLedger for ScoreLedgerImpl {
    async fn find_latest(
        &self,
        deployment_id: Uuid,
        element_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<ScoreEntry>, LedgerError> {
        let row = sqlx::query(
            r"
            SELECT id, deployment_id, change_id, element_id, element_type, student_id,
                   attempt_id, evaluation_id, value, created_at
            FROM score_entries
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

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    async fn insert(&self, entry: &ScoreEntry) -> Result<(), LedgerError> {
        sqlx::query(
            r"
            INSERT INTO score_entries (id, deployment_id, change_id, element_id, element_type,
                                       student_id, attempt_id, evaluation_id, value, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(entry.id.to_string())
        .bind(entry.deployment_id.to_string())
        .bind(entry.change_id.to_string())
        .bind(entry.element_id.to_string())
        .bind(entry.element_type.as_str())
        .bind(entry.student_id.to_string())
        .bind(entry.attempt_id.to_string())
        .bind(entry.evaluation_id.map(|id| id.to_string()))
        .bind(entry.value)
        .bind(format_datetime(&entry.created_at))
        .execute(&self.pool)
        .await?;

        debug!(entry = %entry.id, element = %entry.element_id, value = entry.value, "score appended");
        Ok(())
    }
}
