//! Core services: the four propagation components, the action dispatcher,
//! and the in-process propagation queue.

pub mod attempt_resolver;
pub mod competency_aggregator;
pub mod evaluation_dispatcher;
pub mod interactive_progress;
pub mod pathway_progress;
pub mod progress_propagator;
pub mod propagation_queue;
pub mod score_rollup;

pub use attempt_resolver::{AttemptResolverRegistry, InteractiveAttemptResolver};
pub use competency_aggregator::CompetencyAggregator;
pub use evaluation_dispatcher::{EvaluationDispatcher, EvaluationOutcome};
pub use interactive_progress::InteractiveProgress;
pub use pathway_progress::{CompletionAggregation, PathwayProgress};
pub use progress_propagator::{ProgressPropagator, PropagationOutcome};
pub use propagation_queue::{PropagationQueue, PropagationWorker};
pub use score_rollup::{AdditiveScheme, ScoreRollup, ScoreScheme};
