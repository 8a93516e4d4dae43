//! Engine wiring and lifecycle
//!
//! Builds the ledger adapters, the propagation queue and its single worker,
//! and the evaluation dispatcher once at startup. The dispatcher is the only
//! entry point callers see.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::info;

use crate::domain::models::Config;
use crate::domain::ports::{
    AssociationGraph, AttemptLedger, CompetencyLedger, ProgressLedger, ScopeLedger, ScoreLedger,
};
use crate::infrastructure::database::{
    AssociationGraphImpl, AttemptLedgerImpl, CompetencyLedgerImpl, DatabaseConnection,
    ProgressLedgerImpl, ScopeLedgerImpl, ScoreLedgerImpl,
};
use crate::services::{
    AttemptResolverRegistry, CompetencyAggregator, EvaluationDispatcher, PropagationQueue,
    PropagationWorker, ProgressPropagator, ScoreRollup,
};

/// A fully wired progress engine.
///
/// Owns the database pool and the propagation worker task. Dropping the
/// engine without calling [`Engine::shutdown`] leaves the worker task
/// running until the runtime shuts down.
pub struct Engine {
    db: DatabaseConnection,
    dispatcher: Arc<EvaluationDispatcher>,
    worker: JoinHandle<()>,
}

impl Engine {
    /// Connect, migrate, and wire every service.
    pub async fn start(config: &Config) -> Result<Self> {
        let db = DatabaseConnection::new(&config.database.url, config.database.max_connections)
            .await
            .context("Failed to open database")?;
        db.migrate().await.context("Failed to run migrations")?;

        let pool = db.pool().clone();
        let attempts: Arc<dyn AttemptLedger> = Arc::new(AttemptLedgerImpl::new(pool.clone()));
        let progress: Arc<dyn ProgressLedger> = Arc::new(ProgressLedgerImpl::new(pool.clone()));
        let competency: Arc<dyn CompetencyLedger> =
            Arc::new(CompetencyLedgerImpl::new(pool.clone()));
        let scores: Arc<dyn ScoreLedger> = Arc::new(ScoreLedgerImpl::new(pool.clone()));
        let scopes: Arc<dyn ScopeLedger> = Arc::new(ScopeLedgerImpl::new(pool.clone()));
        let associations: Arc<dyn AssociationGraph> = Arc::new(AssociationGraphImpl::new(pool));

        let (queue, rx) = PropagationQueue::new(config.queue.capacity);
        let propagator = Arc::new(ProgressPropagator::new(
            progress.clone(),
            attempts.clone(),
            Arc::new(queue),
        ));
        let worker = tokio::spawn(PropagationWorker::new(rx, propagator.clone()).run());

        let dispatcher = Arc::new(EvaluationDispatcher::new(
            progress.clone(),
            attempts.clone(),
            scopes,
            propagator,
            Arc::new(ScoreRollup::new(scores)),
            Arc::new(CompetencyAggregator::new(competency, associations)),
            Arc::new(AttemptResolverRegistry::with_defaults(attempts, progress)),
        ));

        info!(
            database = %config.database.url,
            queue_capacity = config.queue.capacity,
            "engine started"
        );
        Ok(Self {
            db,
            dispatcher,
            worker,
        })
    }

    /// Entry point for evaluation events.
    pub fn dispatcher(&self) -> Arc<EvaluationDispatcher> {
        self.dispatcher.clone()
    }

    /// Stop the propagation worker and close the pool.
    ///
    /// The worker holds the propagator, which holds the queue sender, so the
    /// channel never closes on its own; the task is aborted instead.
    pub async fn shutdown(self) {
        self.worker.abort();
        self.db.close().await;
        info!("engine stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        Attempt, CoursewareElement, ElementType, EvaluationAction, EvaluationEvent, PathwayType,
    };
    use uuid::Uuid;

    fn memory_config() -> Config {
        let mut config = Config::default();
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 2;
        config
    }

    #[tokio::test]
    async fn starts_and_stops_cleanly() {
        let engine = Engine::start(&memory_config()).await.expect("engine");
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn dispatches_an_evaluation_end_to_end() {
        let engine = Engine::start(&memory_config()).await.expect("engine");
        let dispatcher = engine.dispatcher();

        let deployment_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let interactive = CoursewareElement::interactive(Uuid::new_v4());
        let pathway = CoursewareElement::pathway(Uuid::new_v4(), PathwayType::Free);
        let attempt = Attempt::first(
            deployment_id,
            student_id,
            interactive.id,
            ElementType::Interactive,
        );

        let event = EvaluationEvent {
            evaluation_id: Uuid::new_v4(),
            deployment_id,
            change_id: Uuid::new_v4(),
            student_id,
            attempt: attempt.clone(),
            ancestry: vec![interactive, pathway],
            completed: false,
            actions: vec![EvaluationAction::ChangeProgress],
        };
        let outcome = dispatcher.handle(&event).await.expect("dispatch");
        // The pathway has never been entered, so the current attempt is kept.
        let next = outcome.next_attempt.expect("next attempt");
        assert_eq!(next.id, attempt.id);

        engine.shutdown().await;
    }
}
