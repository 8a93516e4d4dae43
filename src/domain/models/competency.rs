//! Competency domain models.
//!
//! Competency-met records live on a document-item graph that is independent
//! of the courseware tree. Items are linked by typed associations; only
//! `IsChildOf` edges drive aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::element::ElementType;

/// How an awarded competency value is applied to the latest known value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetencyOperator {
    /// Replace the latest value outright.
    Set,
    /// Add to the latest value (clamped to 1.0).
    Add,
    /// Subtract from the latest value (clamped to 0.0).
    Remove,
}

impl CompetencyOperator {
    /// Apply this operator to the latest known value, clamping the result
    /// into `[0, 1]`.
    pub fn apply(&self, latest: Option<f64>, operand: f64) -> f64 {
        let base = latest.unwrap_or(0.0);
        let raw = match self {
            Self::Set => operand,
            Self::Add => base + operand,
            Self::Remove => base - operand,
        };
        raw.clamp(0.0, 1.0)
    }
}

/// An awarded or computed mastery value for one (student, document, item).
///
/// Confidence is always 1.0 in this design: values are either directly
/// awarded or deterministically averaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyMet {
    /// Time-ordered unique id (UUIDv7).
    pub id: Uuid,
    pub student_id: Uuid,
    pub deployment_id: Uuid,
    pub change_id: Uuid,
    pub source_element_id: Uuid,
    pub source_element_type: ElementType,
    pub evaluation_id: Option<Uuid>,
    pub document_id: Uuid,
    pub document_version_id: Uuid,
    pub document_item_id: Uuid,
    pub attempt_id: Uuid,
    /// Clamped to `[0, 1]`.
    pub value: f64,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// Identity of the evaluation that triggered a competency change; everything
/// a new record needs besides the item and value.
#[derive(Debug, Clone)]
pub struct CompetencySource {
    pub student_id: Uuid,
    pub deployment_id: Uuid,
    pub change_id: Uuid,
    pub source_element_id: Uuid,
    pub source_element_type: ElementType,
    pub evaluation_id: Option<Uuid>,
    pub document_id: Uuid,
    pub document_version_id: Uuid,
    pub attempt_id: Uuid,
}

impl CompetencySource {
    /// Build a record for the given item and value. Value is clamped;
    /// confidence is fixed at 1.0.
    pub fn record(&self, document_item_id: Uuid, value: f64) -> CompetencyMet {
        CompetencyMet {
            id: Uuid::now_v7(),
            student_id: self.student_id,
            deployment_id: self.deployment_id,
            change_id: self.change_id,
            source_element_id: self.source_element_id,
            source_element_type: self.source_element_type,
            evaluation_id: self.evaluation_id,
            document_id: self.document_id,
            document_version_id: self.document_version_id,
            document_item_id,
            attempt_id: self.attempt_id,
            value: value.clamp(0.0, 1.0),
            confidence: 1.0,
            created_at: Utc::now(),
        }
    }
}

/// Kind of edge between two document items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationType {
    /// Origin item is a child of the destination item. The only type that
    /// drives competency aggregation.
    IsChildOf,
    /// Non-hierarchical link; ignored by aggregation.
    IsRelatedTo,
}

impl AssociationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IsChildOf => "is_child_of",
            Self::IsRelatedTo => "is_related_to",
        }
    }
}

impl std::str::FromStr for AssociationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "is_child_of" => Ok(Self::IsChildOf),
            "is_related_to" => Ok(Self::IsRelatedTo),
            other => Err(format!("unknown association type: {other}")),
        }
    }
}

/// Directed edge in the competency-document graph: origin -> destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAssociation {
    pub id: Uuid,
    pub document_id: Uuid,
    pub origin_item_id: Uuid,
    pub destination_item_id: Uuid,
    pub association_type: AssociationType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_latest() {
        assert_eq!(CompetencyOperator::Set.apply(Some(0.9), 0.4), 0.4);
        assert_eq!(CompetencyOperator::Set.apply(None, 0.4), 0.4);
    }

    #[test]
    fn add_clamps_at_one() {
        assert_eq!(CompetencyOperator::Add.apply(Some(0.8), 0.5), 1.0);
        assert_eq!(CompetencyOperator::Add.apply(None, 0.3), 0.3);
    }

    #[test]
    fn remove_clamps_at_zero() {
        assert_eq!(CompetencyOperator::Remove.apply(Some(0.2), 0.5), 0.0);
        let v = CompetencyOperator::Remove.apply(Some(0.8), 0.3);
        assert!((v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn record_clamps_value_and_pins_confidence() {
        let source = CompetencySource {
            student_id: Uuid::new_v4(),
            deployment_id: Uuid::new_v4(),
            change_id: Uuid::new_v4(),
            source_element_id: Uuid::new_v4(),
            source_element_type: ElementType::Interactive,
            evaluation_id: None,
            document_id: Uuid::new_v4(),
            document_version_id: Uuid::new_v4(),
            attempt_id: Uuid::new_v4(),
        };
        let met = source.record(Uuid::new_v4(), 1.5);
        assert_eq!(met.value, 1.0);
        assert_eq!(met.confidence, 1.0);
    }
}
