//! Aggregate progress computation for pathways and activities.
//!
//! A parent's completion is an aggregate over its immediate children's
//! last-known completion pairs. The formula is pathway-type specific; the
//! seam is `CompletionAggregation`, which takes the child map and returns
//! one pair.

use crate::domain::models::{ChildCompletions, Completion, ElementType, PathwayType};

/// Aggregation strategy over a child completion map.
pub trait CompletionAggregation: Send + Sync {
    fn aggregate(&self, children: &ChildCompletions) -> Completion;
}

/// Arithmetic mean of child values and confidences. Used for free, random,
/// graph, and adaptive pathways, and for activities.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanAggregation;

impl CompletionAggregation for MeanAggregation {
    fn aggregate(&self, children: &ChildCompletions) -> Completion {
        if children.is_empty() {
            return Completion::none();
        }
        let count = children.len() as f64;
        let (value_sum, confidence_sum) = children
            .values()
            .fold((0.0, 0.0), |(v, c), child| (v + child.value, c + child.confidence));
        Completion::new(value_sum / count, confidence_sum / count)
    }
}

/// Confidence-weighted mean for linear pathways: each child's last-known
/// value is weighted by the confidence backing it, so freshly evaluated
/// steps dominate stale defaults. Falls back to a plain mean when no child
/// carries any confidence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceWeightedAggregation;

impl CompletionAggregation for ConfidenceWeightedAggregation {
    fn aggregate(&self, children: &ChildCompletions) -> Completion {
        if children.is_empty() {
            return Completion::none();
        }
        let weight_sum: f64 = children.values().map(|c| c.confidence).sum();
        if weight_sum <= 0.0 {
            return MeanAggregation.aggregate(children);
        }
        let weighted_value: f64 = children
            .values()
            .map(|c| c.value * c.confidence)
            .sum::<f64>()
            / weight_sum;
        let mean_confidence = weight_sum / children.len() as f64;
        Completion::new(weighted_value, mean_confidence)
    }
}

/// Selects the aggregation strategy for an element.
#[derive(Default)]
pub struct PathwayProgress {
    mean: MeanAggregation,
    weighted: ConfidenceWeightedAggregation,
}

impl PathwayProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate a child map for an element of the given type.
    pub fn aggregate(
        &self,
        element_type: ElementType,
        pathway_type: Option<PathwayType>,
        children: &ChildCompletions,
    ) -> Completion {
        self.strategy(element_type, pathway_type).aggregate(children)
    }

    fn strategy(
        &self,
        element_type: ElementType,
        pathway_type: Option<PathwayType>,
    ) -> &dyn CompletionAggregation {
        match (element_type, pathway_type) {
            (ElementType::Pathway, Some(PathwayType::Linear)) => &self.weighted,
            _ => &self.mean,
        }
    }
}
