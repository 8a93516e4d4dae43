//! Competency award and parent aggregation.
//!
//! Awards set or adjust a mastery value at one document item; every ancestor
//! in the `IsChildOf` association graph is then recomputed as the average of
//! its children's latest values. The graph is not pre-flattened and its
//! depth is unbounded, so the walk runs inside the triggering unit of work
//! with an explicit stack. An item showing up among its own ancestors means
//! the graph is cyclic, which is a configuration error that aborts the
//! chain.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CompetencyMet, CompetencyOperator, CompetencySource};
use crate::domain::ports::{AssociationGraph, CompetencyLedger};

/// Awards competency values and rolls them up the association graph.
pub struct CompetencyAggregator {
    ledger: Arc<dyn CompetencyLedger>,
    graph: Arc<dyn AssociationGraph>,
}

impl CompetencyAggregator {
    pub fn new(ledger: Arc<dyn CompetencyLedger>, graph: Arc<dyn AssociationGraph>) -> Self {
        Self { ledger, graph }
    }

    /// Apply an operator-driven award at one document item, then recompute
    /// every ancestor. Returns all records persisted, awarded item first.
    pub async fn award(
        &self,
        source: &CompetencySource,
        document_item_id: Uuid,
        operator: CompetencyOperator,
        value: f64,
    ) -> DomainResult<Vec<CompetencyMet>> {
        let latest = self
            .ledger
            .find_latest(source.student_id, source.document_id, document_item_id)
            .await?;
        let awarded_value = operator.apply(latest.map(|m| m.value), value);
        let awarded = source.record(document_item_id, awarded_value);
        self.ledger.insert(&awarded).await?;
        debug!(
            item = %document_item_id,
            value = awarded_value,
            ?operator,
            "competency awarded"
        );

        let mut records = vec![awarded];
        records.extend(self.recompute_ancestors(source, document_item_id).await?);
        Ok(records)
    }

    /// Recompute every ancestor of the item, nearest parents first.
    ///
    /// Each parent's value is the average over *all* its children's latest
    /// values; a child without a record contributes 0 to the sum but still
    /// counts in the denominator, lowering the average rather than being
    /// excluded.
    pub async fn recompute_ancestors(
        &self,
        source: &CompetencySource,
        document_item_id: Uuid,
    ) -> DomainResult<Vec<CompetencyMet>> {
        // Explicit work stack; each entry carries the path that led to it so
        // an item appearing among its own ancestors is caught as a cycle.
        // Diamond-shaped (acyclic) sharing is allowed and recomputes the
        // shared ancestor once per incoming path.
        let mut stack: Vec<(Uuid, Vec<Uuid>)> = self
            .parent_ids(document_item_id)
            .await?
            .into_iter()
            .map(|parent| (parent, vec![document_item_id]))
            .collect();
        let mut records = Vec::new();

        while let Some((item_id, path)) = stack.pop() {
            if path.contains(&item_id) {
                let mut cycle = path;
                cycle.push(item_id);
                warn!(item = %item_id, "association cycle detected, aborting walk");
                return Err(DomainError::AssociationCycle(cycle));
            }

            let record = self.recompute_item(source, item_id).await?;
            records.push(record);

            let mut next_path = path;
            next_path.push(item_id);
            for parent in self.parent_ids(item_id).await? {
                stack.push((parent, next_path.clone()));
            }
        }

        Ok(records)
    }

    /// Average the item's children and persist the result for it.
    async fn recompute_item(
        &self,
        source: &CompetencySource,
        item_id: Uuid,
    ) -> DomainResult<CompetencyMet> {
        let children = self.graph.children_of(item_id).await?;
        let count = children.len();

        let mut sum = 0.0;
        for edge in &children {
            let latest = self
                .ledger
                .find_latest(source.student_id, source.document_id, edge.origin_item_id)
                .await?;
            // Missing child record: contributes 0, still counted.
            sum += latest.map_or(0.0, |m| m.value);
        }

        let average = if count == 0 { 0.0 } else { sum / count as f64 };
        let record = source.record(item_id, average);
        self.ledger.insert(&record).await?;
        debug!(item = %item_id, children = count, value = record.value, "competency recomputed");
        Ok(record)
    }

    async fn parent_ids(&self, item_id: Uuid) -> DomainResult<Vec<Uuid>> {
        Ok(self
            .graph
            .parents_of(item_id)
            .await?
            .into_iter()
            .map(|a| a.destination_item_id)
            .collect())
    }
}
