//! Evaluation action dispatch.
//!
//! One evaluation event carries the evaluated attempt, its ancestry, and
//! the actions the upstream scoring engine triggered. Each action hands off
//! to one core component; afterwards the attempt for the student's next
//! interaction is resolved against the freshly written progress.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Attempt, CompetencySource, ElementType, EvaluationAction, EvaluationEvent, Progress,
    ScopeEntry,
};
use crate::domain::ports::{AttemptLedger, ProgressLedger, ScopeLedger};
use crate::services::attempt_resolver::AttemptResolverRegistry;
use crate::services::competency_aggregator::CompetencyAggregator;
use crate::services::interactive_progress::InteractiveProgress;
use crate::services::progress_propagator::ProgressPropagator;
use crate::services::score_rollup::ScoreRollup;

/// What one evaluation produced, besides the ledger appends.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    /// The attempt the student's next interaction with the interactive will
    /// use. `None` when the interactive has no enclosing pathway (root),
    /// which is an expected terminal state, not an error.
    pub next_attempt: Option<Attempt>,
}

/// Routes evaluation actions to the core components.
pub struct EvaluationDispatcher {
    progress_ledger: Arc<dyn ProgressLedger>,
    attempt_ledger: Arc<dyn AttemptLedger>,
    scope_ledger: Arc<dyn ScopeLedger>,
    interactive_progress: InteractiveProgress,
    propagator: Arc<ProgressPropagator>,
    score_rollup: Arc<ScoreRollup>,
    competency: Arc<CompetencyAggregator>,
    resolvers: Arc<AttemptResolverRegistry>,
}

impl EvaluationDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        progress_ledger: Arc<dyn ProgressLedger>,
        attempt_ledger: Arc<dyn AttemptLedger>,
        scope_ledger: Arc<dyn ScopeLedger>,
        propagator: Arc<ProgressPropagator>,
        score_rollup: Arc<ScoreRollup>,
        competency: Arc<CompetencyAggregator>,
        resolvers: Arc<AttemptResolverRegistry>,
    ) -> Self {
        Self {
            progress_ledger,
            attempt_ledger,
            scope_ledger,
            interactive_progress: InteractiveProgress::new(),
            propagator,
            score_rollup,
            competency,
            resolvers,
        }
    }

    /// Handle one evaluation: run every triggered action, then resolve the
    /// next attempt.
    ///
    /// Validation failures are fatal to the whole event; a failure inside an
    /// action aborts that action's chain and the rest of the event.
    #[instrument(skip_all, fields(evaluation = %event.evaluation_id, student = %event.student_id))]
    pub async fn handle(&self, event: &EvaluationEvent) -> DomainResult<EvaluationOutcome> {
        self.validate(event)?;

        for action in &event.actions {
            match action {
                EvaluationAction::ChangeProgress => self.change_progress(event).await?,
                EvaluationAction::ChangeScore { value } => {
                    self.change_score(event, *value).await?;
                }
                EvaluationAction::ChangeCompetencyMet {
                    document_id,
                    document_version_id,
                    document_item_id,
                    operator,
                    value,
                } => {
                    let source = CompetencySource {
                        student_id: event.student_id,
                        deployment_id: event.deployment_id,
                        change_id: event.change_id,
                        source_element_id: event.attempt.element_id,
                        source_element_type: event.attempt.element_type,
                        evaluation_id: Some(event.evaluation_id),
                        document_id: *document_id,
                        document_version_id: *document_version_id,
                        attempt_id: event.attempt.id,
                    };
                    self.competency
                        .award(&source, *document_item_id, *operator, *value)
                        .await?;
                }
                EvaluationAction::ChangeScope {
                    scope_url,
                    source_id,
                    data,
                } => {
                    let entry = ScopeEntry::new(
                        event.deployment_id,
                        event.student_id,
                        scope_url.clone(),
                        *source_id,
                        data.clone(),
                    );
                    self.scope_ledger.insert(&entry).await?;
                }
            }
        }

        let next_attempt = self.resolve_next_attempt(event).await?;
        info!(actions = event.actions.len(), "evaluation handled");
        Ok(EvaluationOutcome { next_attempt })
    }

    fn validate(&self, event: &EvaluationEvent) -> DomainResult<()> {
        let Some(head) = event.ancestry.first() else {
            return Err(DomainError::EmptyAncestry);
        };
        if head.id != event.attempt.element_id {
            return Err(DomainError::AncestryMismatch {
                head: head.id,
                evaluated: event.attempt.element_id,
            });
        }
        Ok(())
    }

    async fn change_progress(&self, event: &EvaluationEvent) -> DomainResult<()> {
        let completion = self
            .interactive_progress
            .completion(event.attempt.value, event.completed)?;
        let leaf = Progress::interactive(
            event.deployment_id,
            event.change_id,
            event.attempt.element_id,
            event.student_id,
            event.attempt.id,
            Some(event.evaluation_id),
            completion,
        );
        self.progress_ledger.insert(&leaf).await?;
        self.propagator.propagate(&event.ancestry, &leaf).await?;
        Ok(())
    }

    async fn change_score(&self, event: &EvaluationEvent, delta: f64) -> DomainResult<()> {
        let evaluated = &event.ancestry[0];
        let entry = self
            .score_rollup
            .award(
                event.deployment_id,
                event.change_id,
                evaluated,
                event.student_id,
                event.attempt.id,
                Some(event.evaluation_id),
                delta,
            )
            .await?;
        self.score_rollup
            .roll_up(&entry, &event.ancestry[1..], delta)
            .await?;
        Ok(())
    }

    /// Resolve the attempt for the next interaction with the interactive.
    ///
    /// The enclosing pathway is the evaluated element's immediate ancestor;
    /// an interactive with no pathway parent resolves to nothing.
    async fn resolve_next_attempt(
        &self,
        event: &EvaluationEvent,
    ) -> DomainResult<Option<Attempt>> {
        let Some(parent) = event.ancestry.get(1) else {
            return Ok(None);
        };
        if parent.element_type != ElementType::Pathway {
            return Ok(None);
        }
        let pathway_type = parent
            .pathway_type
            .ok_or(DomainError::MissingPathwayType(parent.id))?;
        let Some(parent_attempt) = self
            .attempt_ledger
            .find_latest(event.deployment_id, parent.id, event.student_id)
            .await?
        else {
            // The pathway has never been entered on this side; nothing to
            // attach a new attempt to.
            warn!(pathway = %parent.id, "no pathway attempt found, keeping current attempt");
            return Ok(Some(event.attempt.clone()));
        };

        let resolved = self
            .resolvers
            .resolve(
                pathway_type,
                event.deployment_id,
                event.attempt.element_id,
                event.student_id,
                &parent_attempt,
                &event.attempt,
            )
            .await?;
        Ok(Some(resolved))
    }
}
