//! Leaf progress computation for interactives.
//!
//! On completion the interactive is fully done with full confidence. On a
//! repeat without completion, value approaches 1 with the attempt count but
//! never reaches it, and confidence is capped below certainty so repetition
//! alone cannot claim mastery.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Completion;

/// Confidence ceiling for non-completed repeats.
const CONFIDENCE_CAP: f64 = 0.9;

/// Computes the completion pair for an evaluated interactive.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractiveProgress;

impl InteractiveProgress {
    pub fn new() -> Self {
        Self
    }

    /// Completion for an evaluation of attempt number `attempt_value`.
    ///
    /// Completed evaluations yield `{1.0, 1.0}` regardless of attempt
    /// number. Otherwise, with n = `attempt_value`:
    /// `value = 1 - 1/n`, `confidence = min(0.9, 1 - 0.8/n)`.
    pub fn completion(&self, attempt_value: u32, completed: bool) -> DomainResult<Completion> {
        if attempt_value < 1 {
            return Err(DomainError::InvalidAttemptValue(attempt_value));
        }
        if completed {
            return Ok(Completion::complete());
        }
        let n = f64::from(attempt_value);
        let value = 1.0 - 1.0 / n;
        let confidence = (1.0 - 0.8 / n).min(CONFIDENCE_CAP);
        Ok(Completion::new(value, confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn completed_is_full_regardless_of_attempt() {
        for n in [1, 2, 7, 100] {
            let c = InteractiveProgress::new().completion(n, true).unwrap();
            assert_eq!(c, Completion::complete());
        }
    }

    #[test]
    fn first_attempt_without_completion() {
        let c = InteractiveProgress::new().completion(1, false).unwrap();
        approx(c.value, 0.0);
        approx(c.confidence, 0.2);
    }

    #[test]
    fn fourth_attempt_value() {
        let c = InteractiveProgress::new().completion(4, false).unwrap();
        approx(c.value, 0.75);
    }

    #[test]
    fn fifth_attempt_confidence() {
        let c = InteractiveProgress::new().completion(5, false).unwrap();
        approx(c.confidence, 0.84);
    }

    #[test]
    fn confidence_caps_at_point_nine() {
        let c = InteractiveProgress::new().completion(100, false).unwrap();
        approx(c.confidence, 0.9);
        assert!(c.value < 1.0);
    }

    #[test]
    fn zero_attempt_is_rejected() {
        let err = InteractiveProgress::new().completion(0, false).unwrap_err();
        assert!(matches!(err, DomainError::InvalidAttemptValue(0)));
    }
}
