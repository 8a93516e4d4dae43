//! Evaluation events and propagation hops.
//!
//! An evaluation event is what the upstream scoring engine hands the core:
//! the evaluated attempt, its ancestry (evaluated element first, root last),
//! and the actions the evaluation triggered. A propagation hop is one
//! resumable step of the progress walk handed back through the transport.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attempt::Attempt;
use super::competency::CompetencyOperator;
use super::element::CoursewareElement;
use super::progress::Completion;

/// Action triggered by an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EvaluationAction {
    /// Recompute the evaluated interactive's progress and propagate it up
    /// the ancestry.
    ChangeProgress,
    /// Award points at the evaluated element and roll them up the ancestry.
    ChangeScore { value: f64 },
    /// Award a competency value at a document item and recompute ancestors
    /// in the association graph.
    ChangeCompetencyMet {
        document_id: Uuid,
        document_version_id: Uuid,
        document_item_id: Uuid,
        operator: CompetencyOperator,
        value: f64,
    },
    /// Write scoped student data.
    ChangeScope {
        scope_url: String,
        source_id: Uuid,
        data: serde_json::Value,
    },
}

/// One evaluated answer, as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationEvent {
    pub evaluation_id: Uuid,
    pub deployment_id: Uuid,
    /// Publish-version marker of the deployment.
    pub change_id: Uuid,
    pub student_id: Uuid,
    /// The interactive attempt that was evaluated.
    pub attempt: Attempt,
    /// Evaluated element first, root last. Produced once upstream and passed
    /// through every propagation step unchanged.
    pub ancestry: Vec<CoursewareElement>,
    /// Whether the evaluation marked the interactive complete.
    pub completed: bool,
    pub actions: Vec<EvaluationAction>,
}

/// One resumable step of the ancestry walk: recompute progress for
/// `ancestry[position]` given the child completion that just landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationHop {
    /// Identifies the chain this hop belongs to; all hops of one chain share
    /// it and are consumed in sequence order.
    pub chain_id: Uuid,
    /// Monotonic sequence number: stamped by the queue when the chain-start
    /// hop is emitted, then incremented per hop as the chain is driven.
    pub sequence: u64,
    pub deployment_id: Uuid,
    pub change_id: Uuid,
    pub student_id: Uuid,
    pub evaluation_id: Option<Uuid>,
    pub ancestry: Vec<CoursewareElement>,
    /// Index into `ancestry` of the element to recompute. Always >= 1: the
    /// leaf at position 0 is computed by the dispatcher, not by a hop.
    pub position: usize,
    /// Element id of `ancestry[position - 1]`, whose completion just changed.
    pub child_id: Uuid,
    /// The child's freshly persisted completion.
    pub child_completion: Completion,
}

impl PropagationHop {
    /// The element this hop recomputes, if the position is in range.
    pub fn element(&self) -> Option<&CoursewareElement> {
        self.ancestry.get(self.position)
    }

    /// Successor hop for the next ancestor, after this hop produced
    /// `completion` at its own element.
    pub fn next(&self, completion: Completion) -> Option<Self> {
        let element = self.element()?;
        if self.position + 1 >= self.ancestry.len() {
            return None;
        }
        Some(Self {
            chain_id: self.chain_id,
            sequence: self.sequence + 1,
            deployment_id: self.deployment_id,
            change_id: self.change_id,
            student_id: self.student_id,
            evaluation_id: self.evaluation_id,
            ancestry: self.ancestry.clone(),
            position: self.position + 1,
            child_id: element.id,
            child_completion: completion,
        })
    }
}
