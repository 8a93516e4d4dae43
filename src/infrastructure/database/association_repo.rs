use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::models::{AssociationType, ItemAssociation};
use crate::domain::ports::association_graph::AssociationGraph;
use crate::domain::ports::errors::LedgerError;
use crate::infrastructure::database::utils::format_datetime;

/// SQLite implementation of `AssociationGraph` using sqlx
///
/// Associations are directed origin -> destination. Aggregation only walks
/// `is_child_of` edges, so both queries filter on that type.
pub struct AssociationGraphImpl {
    pool: SqlitePool,
}

impl AssociationGraphImpl {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an edge to the graph. Used when a competency document is
    /// deployed; the recomputation path never writes edges.
    pub async fn insert(&self, association: &ItemAssociation) -> Result<(), LedgerError> {
        sqlx::query(
            r"
            INSERT INTO item_associations (id, document_id, origin_item_id, destination_item_id,
                                           association_type, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(association.id.to_string())
        .bind(association.document_id.to_string())
        .bind(association.origin_item_id.to_string())
        .bind(association.destination_item_id.to_string())
        .bind(association.association_type.as_str())
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn row_to_association(row: &sqlx::sqlite::SqliteRow) -> Result<ItemAssociation, LedgerError> {
        use sqlx::Row;

        Ok(ItemAssociation {
            id: Uuid::parse_str(row.get::<String, _>("id").as_str())?,
            document_id: Uuid::parse_str(row.get::<String, _>("document_id").as_str())?,
            origin_item_id: Uuid::parse_str(row.get::<String, _>("origin_item_id").as_str())?,
            destination_item_id: Uuid::parse_str(
                row.get::<String, _>("destination_item_id").as_str(),
            )?,
            association_type: row
                .get::<String, _>("association_type")
                .parse()
                .map_err(LedgerError::InvalidValue)?,
        })
    }
}

#[async_trait]
impl AssociationGraph for AssociationGraphImpl {
    async fn parents_of(&self, item_id: Uuid) -> Result<Vec<ItemAssociation>, LedgerError> {
        let rows = sqlx::query(
            r"
            SELECT id, document_id, origin_item_id, destination_item_id, association_type
            FROM item_associations
            WHERE origin_item_id = ? AND association_type = ?
            ",
        )
        .bind(item_id.to_string())
        .bind(AssociationType::IsChildOf.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_association).collect()
    }

    async fn children_of(&self, item_id: Uuid) -> Result<Vec<ItemAssociation>, LedgerError> {
        let rows = sqlx::query(
            r"
            SELECT id, document_id, origin_item_id, destination_item_id, association_type
            FROM item_associations
            WHERE destination_item_id = ? AND association_type = ?
            ",
        )
        .bind(item_id.to_string())
        .bind(AssociationType::IsChildOf.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_association).collect()
    }
}
