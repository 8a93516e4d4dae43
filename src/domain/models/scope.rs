//! Scope entry domain model.
//!
//! CHANGE_SCOPE actions append free-form scoped student data keyed by a
//! scope URL. The engine does not interpret the payload; it appends and
//! moves on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scoped student data written by a CHANGE_SCOPE action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeEntry {
    pub id: Uuid,
    pub deployment_id: Uuid,
    pub student_id: Uuid,
    pub scope_url: String,
    pub source_id: Uuid,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl ScopeEntry {
    pub fn new(
        deployment_id: Uuid,
        student_id: Uuid,
        scope_url: String,
        source_id: Uuid,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            deployment_id,
            student_id,
            scope_url,
            source_id,
            data,
            created_at: Utc::now(),
        }
    }
}
