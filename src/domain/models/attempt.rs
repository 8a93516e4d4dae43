//! Attempt domain model.
//!
//! An attempt is one "try" at a walkable element. Attempts are minted by the
//! attempt resolver, appended to the attempt ledger, and never mutated or
//! deleted afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::element::ElementType;

/// One try at a courseware element by one student.
///
/// `value` is a 1-based counter; `parent_id` is the attempt on the enclosing
/// pathway that produced this attempt (an ownership edge, not a cascade).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// Time-ordered unique id (UUIDv7).
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub deployment_id: Uuid,
    pub student_id: Uuid,
    pub element_id: Uuid,
    pub element_type: ElementType,
    /// 1-based attempt counter, always >= 1.
    pub value: u32,
    pub created_at: DateTime<Utc>,
}

impl Attempt {
    /// First attempt at an element, with no enclosing pathway attempt.
    pub fn first(
        deployment_id: Uuid,
        student_id: Uuid,
        element_id: Uuid,
        element_type: ElementType,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            parent_id: None,
            deployment_id,
            student_id,
            element_id,
            element_type,
            value: 1,
            created_at: Utc::now(),
        }
    }

    /// Mint a successor to this attempt with the given counter value, owned
    /// by the given parent pathway attempt.
    pub fn successor(&self, parent_attempt_id: Uuid, value: u32) -> Self {
        debug_assert!(value >= 1, "attempt value is 1-based");
        Self {
            id: Uuid::now_v7(),
            parent_id: Some(parent_attempt_id),
            deployment_id: self.deployment_id,
            student_id: self.student_id,
            element_id: self.element_id,
            element_type: self.element_type,
            value,
            created_at: Utc::now(),
        }
    }
}
