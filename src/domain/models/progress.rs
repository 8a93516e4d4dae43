//! Progress domain model.
//!
//! A progress record is a point-in-time completion/confidence snapshot for
//! one element, one attempt, one student. Records are appended every time
//! propagation recomputes a node; the latest record for (deployment,
//! element, student) wins on the read side.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::element::ElementType;

/// Completion value and the confidence backing it, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub value: f64,
    pub confidence: f64,
}

impl Completion {
    /// Build a completion pair, clamping both components into `[0, 1]`.
    pub fn new(value: f64, confidence: f64) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Full completion with full confidence.
    pub fn complete() -> Self {
        Self {
            value: 1.0,
            confidence: 1.0,
        }
    }

    /// No completion, no confidence. The state of an element nobody has
    /// touched yet.
    pub fn none() -> Self {
        Self {
            value: 0.0,
            confidence: 0.0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.value >= 1.0
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::none()
    }
}

/// Last-known completion of each immediate child, keyed by element id.
/// Aggregation input for pathway and activity progress.
pub type ChildCompletions = BTreeMap<Uuid, Completion>;

/// Append-only progress snapshot for one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Time-ordered unique id (UUIDv7).
    pub id: Uuid,
    pub deployment_id: Uuid,
    /// Publish-version marker of the deployment this was computed against.
    pub change_id: Uuid,
    pub element_id: Uuid,
    pub element_type: ElementType,
    pub student_id: Uuid,
    pub attempt_id: Uuid,
    pub evaluation_id: Option<Uuid>,
    pub completion: Completion,
    /// Empty for interactives; populated for pathways and activities.
    #[serde(default)]
    pub child_completions: ChildCompletions,
    pub created_at: DateTime<Utc>,
}

impl Progress {
    /// Leaf progress for an interactive; no child map.
    #[allow(clippy::too_many_arguments)]
    pub fn interactive(
        deployment_id: Uuid,
        change_id: Uuid,
        element_id: Uuid,
        student_id: Uuid,
        attempt_id: Uuid,
        evaluation_id: Option<Uuid>,
        completion: Completion,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            deployment_id,
            change_id,
            element_id,
            element_type: ElementType::Interactive,
            student_id,
            attempt_id,
            evaluation_id,
            completion,
            child_completions: ChildCompletions::new(),
            created_at: Utc::now(),
        }
    }

    /// Aggregate progress for a pathway or activity, carrying the child map
    /// the aggregate was computed from.
    #[allow(clippy::too_many_arguments)]
    pub fn aggregate(
        deployment_id: Uuid,
        change_id: Uuid,
        element_id: Uuid,
        element_type: ElementType,
        student_id: Uuid,
        attempt_id: Uuid,
        evaluation_id: Option<Uuid>,
        completion: Completion,
        child_completions: ChildCompletions,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            deployment_id,
            change_id,
            element_id,
            element_type,
            student_id,
            attempt_id,
            evaluation_id,
            completion,
            child_completions,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_clamps_both_components() {
        let c = Completion::new(1.7, -0.3);
        assert_eq!(c.value, 1.0);
        assert_eq!(c.confidence, 0.0);
    }

    #[test]
    fn completion_is_complete_at_one() {
        assert!(Completion::complete().is_complete());
        assert!(!Completion::new(0.999, 1.0).is_complete());
        assert!(!Completion::none().is_complete());
    }

    #[test]
    fn interactive_progress_has_no_children() {
        let p = Progress::interactive(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            Completion::complete(),
        );
        assert!(p.child_completions.is_empty());
        assert_eq!(p.element_type, ElementType::Interactive);
    }
}
