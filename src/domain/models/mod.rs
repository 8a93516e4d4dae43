pub mod attempt;
pub mod competency;
pub mod config;
pub mod element;
pub mod evaluation;
pub mod progress;
pub mod scope;
pub mod score;

pub use attempt::Attempt;
pub use competency::{
    AssociationType, CompetencyMet, CompetencyOperator, CompetencySource, ItemAssociation,
};
pub use config::{Config, DatabaseConfig, LoggingConfig, QueueConfig};
pub use element::{CoursewareElement, ElementType, PathwayType};
pub use evaluation::{EvaluationAction, EvaluationEvent, PropagationHop};
pub use progress::{ChildCompletions, Completion, Progress};
pub use scope::ScopeEntry;
pub use score::ScoreEntry;
