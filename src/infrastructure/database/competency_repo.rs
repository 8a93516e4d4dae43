use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::domain::models::CompetencyMet;
use crate::domain::ports::competency_ledger::CompetencyLedger;
use crate::domain::ports::errors::LedgerError;
use crate::infrastructure::database::utils::{format_datetime, parse_datetime};

/// SQLite implementation of `CompetencyLedger` using sqlx
pub struct CompetencyLedgerImpl {
    pool: SqlitePool,
}

impl CompetencyLedgerImpl {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<CompetencyMet, LedgerError> {
        use sqlx::Row;

        Ok(CompetencyMet {
            id: Uuid::parse_str(row.get::<String, _>("id").as_str())?,
            student_id: Uuid::parse_str(row.get::<String, _>("student_id").as_str())?,
            deployment_id: Uuid::parse_str(row.get::<String, _>("deployment_id").as_str())?,
            change_id: Uuid::parse_str(row.get::<String, _>("change_id").as_str())?,
            source_element_id: Uuid::parse_str(
                row.get::<String, _>("source_element_id").as_str(),
            )?,
            source_element_type: row
                .get::<String, _>("source_element_type")
                .parse()
                .map_err(LedgerError::InvalidValue)?,
            evaluation_id: row
                .get::<Option<String>, _>("evaluation_id")
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()?,
            document_id: Uuid::parse_str(row.get::<String, _>("document_id").as_str())?,
            document_version_id: Uuid::parse_str(
                row.get::<String, _>("document_version_id").as_str(),
            )?,
            document_item_id: Uuid::parse_str(row.get::<String, _>("document_item_id").as_str())?,
            attempt_id: Uuid::parse_str(row.get::<String, _>("attempt_id").as_str())?,
            value: row.get::<f64, _>("value"),
            confidence: row.get::<f64, _>("confidence"),
            created_at: parse_datetime(row.get::<String, _>("created_at").as_str())?,
        })
    }
}

#[async_trait]
impl CompetencyLedger for CompetencyLedgerImpl {
    async fn find_latest(
        &self,
        student_id: Uuid,
        document_id: Uuid,
        document_item_id: Uuid,
    ) -> Result<Option<CompetencyMet>, LedgerError> {
        let row = sqlx::query(
            r"
            SELECT id, student_id, deployment_id, change_id, source_element_id,
                   source_element_type, evaluation_id, document_id, document_version_id,
                   document_item_id, attempt_id, value, confidence, created_at
            FROM competency_met
            WHERE student_id = ? AND document_id = ? AND document_item_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(student_id.to_string())
        .bind(document_id.to_string())
        .bind(document_item_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn insert(&self, record: &CompetencyMet) -> Result<(), LedgerError> {
        sqlx::query(
            r"
            INSERT INTO competency_met (id, student_id, deployment_id, change_id,
                                        source_element_id, source_element_type, evaluation_id,
                                        document_id, document_version_id, document_item_id,
                                        attempt_id, value, confidence, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(record.id.to_string())
        .bind(record.student_id.to_string())
        .bind(record.deployment_id.to_string())
        .bind(record.change_id.to_string())
        .bind(record.source_element_id.to_string())
        .bind(record.source_element_type.as_str())
        .bind(record.evaluation_id.map(|id| id.to_string()))
        .bind(record.document_id.to_string())
        .bind(record.document_version_id.to_string())
        .bind(record.document_item_id.to_string())
        .bind(record.attempt_id.to_string())
        .bind(record.value)
        .bind(record.confidence)
        .bind(format_datetime(&record.created_at))
        .execute(&self.pool)
        .await?;

        debug!(
            record = %record.id,
            item = %record.document_item_id,
            value = record.value,
            "competency record appended"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CompetencySource, ElementType};
    use crate::infrastructure::database::connection::DatabaseConnection;

    async fn ledger() -> CompetencyLedgerImpl {
        let db = DatabaseConnection::new("sqlite::memory:", 2)
            .await
            .expect("connection");
        db.migrate().await.expect("migrations");
        CompetencyLedgerImpl::new(db.pool().clone())
    }

    fn source() -> CompetencySource {
        CompetencySource {
            student_id: Uuid::new_v4(),
            deployment_id: Uuid::new_v4(),
            change_id: Uuid::new_v4(),
            source_element_id: Uuid::new_v4(),
            source_element_type: ElementType::Interactive,
            evaluation_id: Some(Uuid::new_v4()),
            document_id: Uuid::new_v4(),
            document_version_id: Uuid::new_v4(),
            attempt_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn round_trips_a_record() {
        let ledger = ledger().await;
        let src = source();
        let item = Uuid::new_v4();
        let record = src.record(item, 0.75);
        ledger.insert(&record).await.unwrap();

        let found = ledger
            .find_latest(src.student_id, src.document_id, item)
            .await
            .unwrap()
            .expect("record");
        assert_eq!(found.value, 0.75);
        assert_eq!(found.confidence, 1.0);
        assert_eq!(found.document_version_id, src.document_version_id);
        assert_eq!(found.evaluation_id, src.evaluation_id);
    }

    #[tokio::test]
    async fn lookup_is_scoped_to_student_document_item() {
        let ledger = ledger().await;
        let src = source();
        let item = Uuid::new_v4();
        ledger.insert(&src.record(item, 0.5)).await.unwrap();

        let other_student = ledger
            .find_latest(Uuid::new_v4(), src.document_id, item)
            .await
            .unwrap();
        assert!(other_student.is_none());

        let other_item = ledger
            .find_latest(src.student_id, src.document_id, Uuid::new_v4())
            .await
            .unwrap();
        assert!(other_item.is_none());
    }
}
