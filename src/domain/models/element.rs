//! Courseware element identity.
//!
//! Elements form a tree: activities contain pathways, pathways contain
//! interactives or further activities. Evaluations carry their ancestry as
//! an ordered list, evaluated element first, root last.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of courseware element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Activity,
    Pathway,
    Interactive,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Pathway => "pathway",
            Self::Interactive => "interactive",
        }
    }
}

impl std::str::FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "activity" => Ok(Self::Activity),
            "pathway" => Ok(Self::Pathway),
            "interactive" => Ok(Self::Interactive),
            other => Err(format!("unknown element type: {other}")),
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Walk discipline of a pathway. Drives attempt-resolution policy and the
/// completion aggregation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathwayType {
    /// Children are walked in authored order.
    Linear,
    /// Children may be walked in any order.
    Free,
    /// Children are presented in shuffled order.
    Random,
    /// Children form a directed graph; self-loops are allowed.
    Graph,
    /// Adaptive mastery pathway (Bayesian knowledge tracing upstream).
    AlgoBkt,
}

impl PathwayType {
    pub const ALL: [Self; 5] = [
        Self::Linear,
        Self::Free,
        Self::Random,
        Self::Graph,
        Self::AlgoBkt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Free => "free",
            Self::Random => "random",
            Self::Graph => "graph",
            Self::AlgoBkt => "algo_bkt",
        }
    }
}

impl std::str::FromStr for PathwayType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "free" => Ok(Self::Free),
            "random" => Ok(Self::Random),
            "graph" => Ok(Self::Graph),
            "algo_bkt" | "bkt" => Ok(Self::AlgoBkt),
            other => Err(format!("unknown pathway type: {other}")),
        }
    }
}

impl std::fmt::Display for PathwayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One node of the courseware tree as it appears in an ancestry list.
///
/// `pathway_type` is present only when `element_type` is `Pathway`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoursewareElement {
    pub id: Uuid,
    pub element_type: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathway_type: Option<PathwayType>,
}

impl CoursewareElement {
    pub fn activity(id: Uuid) -> Self {
        Self {
            id,
            element_type: ElementType::Activity,
            pathway_type: None,
        }
    }

    pub fn pathway(id: Uuid, pathway_type: PathwayType) -> Self {
        Self {
            id,
            element_type: ElementType::Pathway,
            pathway_type: Some(pathway_type),
        }
    }

    pub fn interactive(id: Uuid) -> Self {
        Self {
            id,
            element_type: ElementType::Interactive,
            pathway_type: None,
        }
    }
}
