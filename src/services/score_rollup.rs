//! Score rollup along the ancestry.
//!
//! Structurally the progress walk's sibling: one new entry per ancestor,
//! strictly sequential, oldest-child-first. Each insert is awaited before
//! the next ancestor's combine, so no ancestor's rollup begins before its
//! child's value exists. The combination function itself is a seam; the
//! engine only owns the ordering.

use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CoursewareElement, ScoreEntry};
use crate::domain::ports::ScoreLedger;

/// How an evaluation's score contribution lands in an ancestor's aggregate.
pub trait ScoreScheme: Send + Sync {
    /// Combine an ancestor's latest aggregate (absent when the element has
    /// never been scored) with the chain's contribution.
    fn combine(&self, previous: Option<f64>, contribution: f64) -> f64;
}

/// Default scheme: the contribution is a delta added to the latest
/// aggregate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdditiveScheme;

impl ScoreScheme for AdditiveScheme {
    fn combine(&self, previous: Option<f64>, contribution: f64) -> f64 {
        previous.unwrap_or(0.0) + contribution
    }
}

/// Rolls one evaluation's score contribution up the ancestry.
pub struct ScoreRollup {
    ledger: Arc<dyn ScoreLedger>,
    scheme: Arc<dyn ScoreScheme>,
}

impl ScoreRollup {
    pub fn new(ledger: Arc<dyn ScoreLedger>) -> Self {
        Self {
            ledger,
            scheme: Arc::new(AdditiveScheme),
        }
    }

    pub fn with_scheme(mut self, scheme: Arc<dyn ScoreScheme>) -> Self {
        self.scheme = scheme;
        self
    }

    /// Persist the evaluated element's own new entry: the awarded delta
    /// combined with its latest aggregate. Rollup over the ancestors starts
    /// from the entry this returns.
    #[allow(clippy::too_many_arguments)]
    pub async fn award(
        &self,
        deployment_id: uuid::Uuid,
        change_id: uuid::Uuid,
        element: &CoursewareElement,
        student_id: uuid::Uuid,
        attempt_id: uuid::Uuid,
        evaluation_id: Option<uuid::Uuid>,
        delta: f64,
    ) -> DomainResult<ScoreEntry> {
        let previous = self
            .ledger
            .find_latest(deployment_id, element.id, student_id)
            .await?
            .map(|e| e.value);
        let entry = ScoreEntry {
            id: uuid::Uuid::now_v7(),
            deployment_id,
            change_id,
            element_id: element.id,
            element_type: element.element_type,
            student_id,
            attempt_id,
            evaluation_id,
            value: self.scheme.combine(previous, delta),
            created_at: chrono::Utc::now(),
        };
        self.ledger.insert(&entry).await?;
        debug!(element = %element.id, value = entry.value, delta, "score awarded");
        Ok(entry)
    }

    /// Persist one rolled-up entry per ancestor, in ancestry order.
    ///
    /// `entry` is the already-persisted score entry for the evaluated
    /// element; `ancestry_tail` excludes that element. `contribution` is the
    /// delta the evaluation awarded. An empty tail means the evaluated
    /// element was the root and there is nothing to roll up.
    pub async fn roll_up(
        &self,
        entry: &ScoreEntry,
        ancestry_tail: &[CoursewareElement],
        contribution: f64,
    ) -> DomainResult<Vec<ScoreEntry>> {
        let mut rolled = Vec::with_capacity(ancestry_tail.len());
        for ancestor in ancestry_tail {
            let previous = self
                .ledger
                .find_latest(entry.deployment_id, ancestor.id, entry.student_id)
                .await?
                .map(|e| e.value);
            let value = self.scheme.combine(previous, contribution);
            let ancestor_entry = entry.for_element(ancestor.id, ancestor.element_type, value);
            self.ledger.insert(&ancestor_entry).await?;
            debug!(
                element = %ancestor.id,
                value,
                contribution,
                "score rolled up"
            );
            rolled.push(ancestor_entry);
        }
        Ok(rolled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ElementType, PathwayType};
    use crate::domain::ports::errors::LedgerError;
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    /// In-memory append-only score ledger.
    #[derive(Default)]
    struct MemoryLedger {
        entries: Mutex<Vec<ScoreEntry>>,
    }

    #[async_trait]
    impl ScoreLedger for MemoryLedger {
        async fn find_latest(
            &self,
            deployment_id: Uuid,
            element_id: Uuid,
            student_id: Uuid,
        ) -> Result<Option<ScoreEntry>, LedgerError> {
            Ok(self
                .entries
                .lock()
                .await
                .iter()
                .rev()
                .find(|e| {
                    e.deployment_id == deployment_id
                        && e.element_id == element_id
                        && e.student_id == student_id
                })
                .cloned())
        }

        async fn insert(&self, entry: &ScoreEntry) -> Result<(), LedgerError> {
            self.entries.lock().await.push(entry.clone());
            Ok(())
        }
    }

    fn evaluated_entry(value: f64) -> ScoreEntry {
        ScoreEntry {
            id: Uuid::now_v7(),
            deployment_id: Uuid::new_v4(),
            change_id: Uuid::new_v4(),
            element_id: Uuid::new_v4(),
            element_type: ElementType::Interactive,
            student_id: Uuid::new_v4(),
            attempt_id: Uuid::new_v4(),
            evaluation_id: Some(Uuid::new_v4()),
            value,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn rolls_one_entry_per_ancestor_in_order() {
        let ledger = Arc::new(MemoryLedger::default());
        let rollup = ScoreRollup::new(ledger.clone());
        let entry = evaluated_entry(10.0);
        let tail = vec![
            CoursewareElement::pathway(Uuid::new_v4(), PathwayType::Linear),
            CoursewareElement::activity(Uuid::new_v4()),
        ];

        let rolled = rollup.roll_up(&entry, &tail, 10.0).await.unwrap();

        assert_eq!(rolled.len(), 2);
        assert_eq!(rolled[0].element_id, tail[0].id);
        assert_eq!(rolled[1].element_id, tail[1].id);
        assert_eq!(rolled[0].value, 10.0);
        assert_eq!(rolled[1].value, 10.0);
        assert_eq!(ledger.entries.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn delta_lands_on_top_of_latest_aggregates() {
        let ledger = Arc::new(MemoryLedger::default());
        let entry = evaluated_entry(15.0);
        let pathway = CoursewareElement::pathway(Uuid::new_v4(), PathwayType::Free);

        // The pathway already holds 20 points from earlier evaluations.
        ledger
            .insert(&entry.for_element(pathway.id, ElementType::Pathway, 20.0))
            .await
            .unwrap();

        let rollup = ScoreRollup::new(ledger.clone());
        let rolled = rollup
            .roll_up(&entry, std::slice::from_ref(&pathway), 5.0)
            .await
            .unwrap();

        assert_eq!(rolled[0].value, 25.0);
    }

    #[tokio::test]
    async fn empty_tail_rolls_nothing() {
        let ledger = Arc::new(MemoryLedger::default());
        let rollup = ScoreRollup::new(ledger.clone());
        let entry = evaluated_entry(3.0);

        let rolled = rollup.roll_up(&entry, &[], 3.0).await.unwrap();
        assert!(rolled.is_empty());
        assert!(ledger.entries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn custom_scheme_replaces_the_default() {
        struct MaxScheme;
        impl ScoreScheme for MaxScheme {
            fn combine(&self, previous: Option<f64>, contribution: f64) -> f64 {
                previous.unwrap_or(0.0).max(contribution)
            }
        }

        let ledger = Arc::new(MemoryLedger::default());
        let entry = evaluated_entry(4.0);
        let pathway = CoursewareElement::pathway(Uuid::new_v4(), PathwayType::Graph);
        ledger
            .insert(&entry.for_element(pathway.id, ElementType::Pathway, 9.0))
            .await
            .unwrap();

        let rollup = ScoreRollup::new(ledger).with_scheme(Arc::new(MaxScheme));
        let rolled = rollup
            .roll_up(&entry, std::slice::from_ref(&pathway), 4.0)
            .await
            .unwrap();
        assert_eq!(rolled[0].value, 9.0);
    }
}
