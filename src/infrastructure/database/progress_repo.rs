use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::domain::models::{ChildCompletions, Completion, Progress};
use crate::domain::ports::errors::LedgerError;
use crate::domain::ports::progress_ledger::ProgressLedger;
use crate::infrastructure::database::utils::{format_datetime, parse_datetime};

/// SQLite implementation of `ProgressLedger` using sqlx
///
/// The child completion map is stored as a JSON column, mirroring how the
/// propagator consumes it: read whole, update one entry, append whole.
pub struct ProgressLedgerImpl {
    pool: SqlitePool,
}

impl ProgressLedgerImpl {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_progress(row: &sqlx::sqlite::SqliteRow) -> Result<Progress, LedgerError> {
        use sqlx::Row;

        let child_completions: ChildCompletions =
            serde_json::from_str(row.get::<String, _>("child_completions").as_str())?;

        Ok(Progress {
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
            completion: Completion::new(
                row.get::<f64, _>("completion_value"),
                row.get::<f64, _>("completion_confidence"),
            ),
            child_completions,
            created_at: parse_datetime(row.get::<String, _>("created_at").as_str())?,
        })
    }
}

#[async_trait]
impl ProgressLedger for ProgressLedgerImpl {
    async fn find_latest(
        &self,
        deployment_id: Uuid,
        element_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Progress>, LedgerError> {
        let row = sqlx::query(
            r"
            SELECT id, deployment_id, change_id, element_id, element_type, student_id,
                   attempt_id, evaluation_id, completion_value, completion_confidence,
                   child_completions, created_at
            FROM progress_records
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

        row.as_ref().map(Self::row_to_progress).transpose()
    }

    async fn insert(&self, progress: &Progress) -> Result<(), LedgerError> {
        sqlx::query(
            r"
            INSERT INTO progress_records (id, deployment_id, change_id, element_id, element_type,
                                          student_id, attempt_id, evaluation_id, completion_value,
                                          completion_confidence, child_completions, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(progress.id.to_string())
        .bind(progress.deployment_id.to_string())
        .bind(progress.change_id.to_string())
        .bind(progress.element_id.to_string())
        .bind(progress.element_type.as_str())
        .bind(progress.student_id.to_string())
        .bind(progress.attempt_id.to_string())
        .bind(progress.evaluation_id.map(|id| id.to_string()))
        .bind(progress.completion.value)
        .bind(progress.completion.confidence)
        .bind(serde_json::to_string(&progress.child_completions)?)
        .bind(format_datetime(&progress.created_at))
        .execute(&self.pool)
        .await?;

        debug!(
            progress = %progress.id,
            element = %progress.element_id,
            value = progress.completion.value,
            "progress appended"
        );
        Ok(())
    }
}
