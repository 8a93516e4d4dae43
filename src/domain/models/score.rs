//! Score domain model.
//!
//! Score entries are append-only numeric aggregates per (deployment,
//! element, student). The rollup appends one entry per ancestor when an
//! evaluation awards points.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::element::ElementType;

/// One score snapshot for one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Time-ordered unique id (UUIDv7).
    pub id: Uuid,
    pub deployment_id: Uuid,
    pub change_id: Uuid,
    pub element_id: Uuid,
    pub element_type: ElementType,
    pub student_id: Uuid,
    pub attempt_id: Uuid,
    pub evaluation_id: Option<Uuid>,
    pub value: f64,
    pub created_at: DateTime<Utc>,
}

impl ScoreEntry {
    /// New snapshot for a sibling element in the same chain, keeping the
    /// student/deployment/attempt identity of this entry.
    pub fn for_element(
        &self,
        element_id: Uuid,
        element_type: ElementType,
        value: f64,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            deployment_id: self.deployment_id,
            change_id: self.change_id,
            element_id,
            element_type,
            student_id: self.student_id,
            attempt_id: self.attempt_id,
            evaluation_id: self.evaluation_id,
            value,
            created_at: Utc::now(),
        }
    }
}
