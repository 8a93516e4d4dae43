use crate::domain::models::ItemAssociation;
use crate::domain::ports::errors::LedgerError;
use async_trait::async_trait;
use uuid::Uuid;

/// Read-side port over the competency-document association graph.
///
/// Edges are directed origin -> destination. Both queries filter to
/// `IsChildOf` edges, the only type that drives aggregation.
#[async_trait]
pub trait AssociationGraph: Send + Sync {
    /// Associations *from* the item: the item's parents.
    async fn parents_of(&self, item_id: Uuid) -> Result<Vec<ItemAssociation>, LedgerError>;

    /// Associations *to* the item: the item's children.
    async fn children_of(&self, item_id: Uuid) -> Result<Vec<ItemAssociation>, LedgerError>;
}
