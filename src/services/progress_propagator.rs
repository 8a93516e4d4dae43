//! Ancestry-walk progress propagation.
//!
//! Each recomputation is one hop: recompute one ancestor from its child
//! map, persist, then return the next hop to whoever is driving the chain.
//! Only the chain-start hop goes through the transport; successors are
//! handed back so the consumer never has to await its own queue. The walk
//! is a sequence of discrete units of work rather than nested calls, so
//! depth is bounded by ancestry length, not by the call stack.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Attempt, CoursewareElement, Progress, PropagationHop,
};
use crate::domain::ports::{AttemptLedger, ProgressLedger, ProgressTransport};
use crate::services::pathway_progress::PathwayProgress;

/// Result of one propagation step.
#[derive(Debug, Clone, PartialEq)]
pub enum PropagationOutcome {
    /// The chain continues at the carried hop. `propagate` has already
    /// handed it to the transport; `handle_hop` has not — its caller drives
    /// the successor itself.
    Forwarded(PropagationHop),
    /// The walk reached the root; the carried progress is the final result
    /// of the whole chain.
    Completed(Progress),
}

/// Recomputes ancestor progress one hop at a time.
pub struct ProgressPropagator {
    progress: Arc<dyn ProgressLedger>,
    attempts: Arc<dyn AttemptLedger>,
    transport: Arc<dyn ProgressTransport>,
    aggregation: PathwayProgress,
}

impl ProgressPropagator {
    pub fn new(
        progress: Arc<dyn ProgressLedger>,
        attempts: Arc<dyn AttemptLedger>,
        transport: Arc<dyn ProgressTransport>,
    ) -> Self {
        Self {
            progress,
            attempts,
            transport,
            aggregation: PathwayProgress::new(),
        }
    }

    /// Start a chain for a freshly persisted leaf progress at ancestry
    /// position 0.
    ///
    /// A leaf with no ancestors is already the final result; otherwise the
    /// first hop is emitted for `ancestry[1]`.
    pub async fn propagate(
        &self,
        ancestry: &[CoursewareElement],
        leaf: &Progress,
    ) -> DomainResult<PropagationOutcome> {
        let Some(head) = ancestry.first() else {
            return Err(DomainError::EmptyAncestry);
        };
        if head.id != leaf.element_id {
            return Err(DomainError::AncestryMismatch {
                head: head.id,
                evaluated: leaf.element_id,
            });
        }
        if ancestry.len() == 1 {
            debug!(element = %leaf.element_id, "evaluated element is the root, chain done");
            return Ok(PropagationOutcome::Completed(leaf.clone()));
        }

        let hop = PropagationHop {
            chain_id: Uuid::new_v4(),
            sequence: 0,
            deployment_id: leaf.deployment_id,
            change_id: leaf.change_id,
            student_id: leaf.student_id,
            evaluation_id: leaf.evaluation_id,
            ancestry: ancestry.to_vec(),
            position: 1,
            child_id: leaf.element_id,
            child_completion: leaf.completion,
        };
        self.transport.emit(hop.clone()).await?;
        Ok(PropagationOutcome::Forwarded(hop))
    }

    /// Recompute the element at the hop's position and return the successor.
    ///
    /// Invoked by the queue worker, which drives each chain hop by hop. The
    /// successor is returned rather than emitted: re-queueing it would let
    /// the worker block on the bounded channel it is the only consumer of.
    pub async fn handle_hop(&self, hop: &PropagationHop) -> DomainResult<PropagationOutcome> {
        let element = hop
            .element()
            .ok_or(DomainError::PositionOutOfRange {
                position: hop.position,
                len: hop.ancestry.len(),
            })?
            .clone();

        let previous = self
            .progress
            .find_latest(hop.deployment_id, element.id, hop.student_id)
            .await?;
        let mut children = previous.map(|p| p.child_completions).unwrap_or_default();
        children.insert(hop.child_id, hop.child_completion);

        let completion =
            self.aggregation
                .aggregate(element.element_type, element.pathway_type, &children);
        let attempt_id = self.attempt_for(hop, &element).await?;

        let record = Progress::aggregate(
            hop.deployment_id,
            hop.change_id,
            element.id,
            element.element_type,
            hop.student_id,
            attempt_id,
            hop.evaluation_id,
            completion,
            children,
        );
        self.progress.insert(&record).await?;
        debug!(
            chain = %hop.chain_id,
            element = %element.id,
            value = completion.value,
            confidence = completion.confidence,
            "ancestor progress recomputed"
        );

        match hop.next(completion) {
            Some(next) => Ok(PropagationOutcome::Forwarded(next)),
            None => {
                info!(chain = %hop.chain_id, element = %element.id, "propagation chain complete");
                Ok(PropagationOutcome::Completed(record))
            }
        }
    }

    /// The ancestor's current attempt; walking into an element for the
    /// first time is what creates its first attempt.
    async fn attempt_for(
        &self,
        hop: &PropagationHop,
        element: &CoursewareElement,
    ) -> DomainResult<Uuid> {
        if let Some(attempt) = self
            .attempts
            .find_latest(hop.deployment_id, element.id, hop.student_id)
            .await?
        {
            return Ok(attempt.id);
        }
        let first = Attempt::first(
            hop.deployment_id,
            hop.student_id,
            element.id,
            element.element_type,
        );
        self.attempts.insert(&first).await?;
        Ok(first.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ChildCompletions, Completion, ElementType, PathwayType};
    use crate::domain::ports::errors::LedgerError;
    use async_trait::async_trait;
    use mockall::mock;
    use tokio::sync::Mutex;

    mock! {
        pub AttemptStore {}

        #[async_trait]
        impl AttemptLedger for AttemptStore {
            async fn find_latest(
                &self,
                deployment_id: Uuid,
                element_id: Uuid,
                student_id: Uuid,
            ) -> Result<Option<Attempt>, LedgerError>;
            async fn insert(&self, attempt: &Attempt) -> Result<(), LedgerError>;
        }
    }

    mock! {
        pub ProgressStore {}

        #[async_trait]
        impl ProgressLedger for ProgressStore {
            async fn find_latest(
                &self,
                deployment_id: Uuid,
                element_id: Uuid,
                student_id: Uuid,
            ) -> Result<Option<Progress>, LedgerError>;
            async fn insert(&self, progress: &Progress) -> Result<(), LedgerError>;
        }
    }

    /// Captures emitted hops instead of delivering them.
    #[derive(Default)]
    struct CaptureTransport {
        hops: Mutex<Vec<PropagationHop>>,
    }

    #[async_trait]
    impl ProgressTransport for CaptureTransport {
        async fn emit(&self, hop: PropagationHop) -> DomainResult<()> {
            self.hops.lock().await.push(hop);
            Ok(())
        }
    }

    fn ancestry(depth: usize) -> Vec<CoursewareElement> {
        (0..depth)
            .map(|i| {
                if i == 0 {
                    CoursewareElement::interactive(Uuid::new_v4())
                } else if i == depth - 1 {
                    CoursewareElement::activity(Uuid::new_v4())
                } else {
                    CoursewareElement::pathway(Uuid::new_v4(), PathwayType::Free)
                }
            })
            .collect()
    }

    fn leaf_progress(element_id: Uuid, completion: Completion) -> Progress {
        Progress::interactive(
            Uuid::new_v4(),
            Uuid::new_v4(),
            element_id,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            completion,
        )
    }

    fn propagator(
        progress: MockProgressStore,
        attempts: MockAttemptStore,
        transport: Arc<CaptureTransport>,
    ) -> ProgressPropagator {
        ProgressPropagator::new(Arc::new(progress), Arc::new(attempts), transport)
    }

    #[tokio::test]
    async fn empty_ancestry_is_rejected() {
        let transport = Arc::new(CaptureTransport::default());
        let p = propagator(MockProgressStore::new(), MockAttemptStore::new(), transport);
        let leaf = leaf_progress(Uuid::new_v4(), Completion::complete());
        let err = p.propagate(&[], &leaf).await.unwrap_err();
        assert!(matches!(err, DomainError::EmptyAncestry));
    }

    #[tokio::test]
    async fn mismatched_head_is_rejected() {
        let transport = Arc::new(CaptureTransport::default());
        let p = propagator(MockProgressStore::new(), MockAttemptStore::new(), transport);
        let chain = ancestry(2);
        let leaf = leaf_progress(Uuid::new_v4(), Completion::complete());
        let err = p.propagate(&chain, &leaf).await.unwrap_err();
        assert!(matches!(err, DomainError::AncestryMismatch { .. }));
    }

    #[tokio::test]
    async fn root_leaf_completes_immediately() {
        let transport = Arc::new(CaptureTransport::default());
        let p = propagator(
            MockProgressStore::new(),
            MockAttemptStore::new(),
            transport.clone(),
        );
        let chain = ancestry(1);
        let leaf = leaf_progress(chain[0].id, Completion::complete());
        let outcome = p.propagate(&chain, &leaf).await.unwrap();
        assert_eq!(outcome, PropagationOutcome::Completed(leaf));
        assert!(transport.hops.lock().await.is_empty());
    }

    #[tokio::test]
    async fn leaf_with_ancestors_emits_first_hop() {
        let transport = Arc::new(CaptureTransport::default());
        let p = propagator(
            MockProgressStore::new(),
            MockAttemptStore::new(),
            transport.clone(),
        );
        let chain = ancestry(3);
        let leaf = leaf_progress(chain[0].id, Completion::new(0.5, 0.6));
        let outcome = p.propagate(&chain, &leaf).await.unwrap();
        assert!(matches!(outcome, PropagationOutcome::Forwarded(_)));

        let hops = transport.hops.lock().await;
        assert_eq!(hops.len(), 1);
        assert_eq!(hops[0].position, 1);
        assert_eq!(hops[0].child_id, chain[0].id);
        assert_eq!(hops[0].child_completion, Completion::new(0.5, 0.6));
    }

    #[tokio::test]
    async fn hop_updates_child_map_and_forwards() {
        let chain = ancestry(3);
        let student_id = Uuid::new_v4();
        let deployment_id = Uuid::new_v4();

        // Parent pathway already knows one sibling at full completion.
        let sibling = Uuid::new_v4();
        let mut known = ChildCompletions::new();
        known.insert(sibling, Completion::complete());
        let previous = Progress::aggregate(
            deployment_id,
            Uuid::new_v4(),
            chain[1].id,
            ElementType::Pathway,
            student_id,
            Uuid::new_v4(),
            None,
            Completion::complete(),
            known,
        );

        let mut progress = MockProgressStore::new();
        progress
            .expect_find_latest()
            .returning(move |_, _, _| Ok(Some(previous.clone())));
        let inserted: Arc<Mutex<Vec<Progress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = inserted.clone();
        progress.expect_insert().returning(move |p| {
            sink.try_lock().unwrap().push(p.clone());
            Ok(())
        });

        let mut attempts = MockAttemptStore::new();
        let pathway_attempt = Attempt::first(
            deployment_id,
            student_id,
            chain[1].id,
            ElementType::Pathway,
        );
        let pathway_attempt_id = pathway_attempt.id;
        attempts
            .expect_find_latest()
            .returning(move |_, _, _| Ok(Some(pathway_attempt.clone())));

        let transport = Arc::new(CaptureTransport::default());
        let p = propagator(progress, attempts, transport.clone());

        let hop = PropagationHop {
            chain_id: Uuid::new_v4(),
            sequence: 1,
            deployment_id,
            change_id: Uuid::new_v4(),
            student_id,
            evaluation_id: None,
            ancestry: chain.clone(),
            position: 1,
            child_id: chain[0].id,
            child_completion: Completion::new(0.5, 0.6),
        };
        let outcome = p.handle_hop(&hop).await.unwrap();
        let PropagationOutcome::Forwarded(next) = outcome else {
            panic!("expected the chain to continue");
        };

        let records = inserted.lock().await;
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.element_id, chain[1].id);
        assert_eq!(record.attempt_id, pathway_attempt_id);
        assert_eq!(record.child_completions.len(), 2);
        // Mean of {1.0, 0.5} and {1.0, 0.6}.
        assert!((record.completion.value - 0.75).abs() < 1e-12);
        assert!((record.completion.confidence - 0.8).abs() < 1e-12);

        // The successor is returned to the caller, not emitted.
        assert_eq!(next.position, 2);
        assert_eq!(next.child_id, chain[1].id);
        assert!(transport.hops.lock().await.is_empty());
    }

    #[tokio::test]
    async fn chain_terminates_after_exactly_ancestor_count_hops() {
        let chain = ancestry(4);
        let student_id = Uuid::new_v4();
        let deployment_id = Uuid::new_v4();

        let mut progress = MockProgressStore::new();
        progress.expect_find_latest().returning(|_, _, _| Ok(None));
        progress.expect_insert().returning(|_| Ok(()));
        let mut attempts = MockAttemptStore::new();
        attempts.expect_find_latest().returning(|_, _, _| Ok(None));
        attempts.expect_insert().returning(|_| Ok(()));

        let transport = Arc::new(CaptureTransport::default());
        let p = propagator(progress, attempts, transport.clone());

        let mut hop = PropagationHop {
            chain_id: Uuid::new_v4(),
            sequence: 0,
            deployment_id,
            change_id: Uuid::new_v4(),
            student_id,
            evaluation_id: None,
            ancestry: chain.clone(),
            position: 1,
            child_id: chain[0].id,
            child_completion: Completion::complete(),
        };

        let mut visited = Vec::new();
        let mut hops_handled = 0;
        loop {
            visited.push(chain[hop.position].id);
            hops_handled += 1;
            match p.handle_hop(&hop).await.unwrap() {
                PropagationOutcome::Forwarded(next) => hop = next,
                PropagationOutcome::Completed(final_progress) => {
                    assert_eq!(final_progress.element_id, chain[3].id);
                    break;
                }
            }
        }

        // len(ancestry) - evaluated_index - 1 hops, no ancestor revisited,
        // nothing re-queued.
        assert_eq!(hops_handled, chain.len() - 1);
        let mut unique = visited.clone();
        unique.dedup();
        assert_eq!(unique, visited);
        assert!(transport.hops.lock().await.is_empty());
    }
}
