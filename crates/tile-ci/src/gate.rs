//! Review gate evaluation.

use crate::review::SkillReview;
use serde::{Deserialize, Serialize};

/// Gate evaluation verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewVerdict {
    /// Whether the gate passed.
    pub passed: bool,

    /// Skills that scored below the threshold (empty if passed).
    pub violations: Vec<String>,

    /// Summary message.
    pub message: String,
}

/// Pass/fail rules over a set of skill reviews.
pub struct ReviewGate;

impl ReviewGate {
    /// Evaluate the reviews of every skill in a tile.
    ///
    /// Gate rule:
    /// - A skill with a determined score below `threshold` is a violation
    /// - An undetermined score never fails the gate
    /// - No skills at all passes
    pub fn evaluate(reviews: &[SkillReview], threshold: f64) -> ReviewVerdict {
        let violations: Vec<String> = reviews
            .iter()
            .filter(|r| !r.result.passed)
            .map(|r| {
                format!(
                    "Skill '{}' scored {}/100 (threshold: {})",
                    r.path.display(),
                    r.result.score,
                    threshold
                )
            })
            .collect();

        let passed = violations.is_empty();
        let message = if reviews.is_empty() {
            "No skills to review".to_string()
        } else if passed {
            format!("All {} skill(s) passed review", reviews.len())
        } else {
            format!(
                "Review gate failed: {} of {} skill(s) below threshold",
                violations.len(),
                reviews.len()
            )
        };

        ReviewVerdict {
            passed,
            violations,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::ReviewResult;
    use std::path::PathBuf;

    fn review(path: &str, passed: bool, score: i32) -> SkillReview {
        SkillReview {
            path: PathBuf::from(path),
            result: ReviewResult {
                passed,
                score,
                raw_output: String::new(),
            },
        }
    }

    #[test]
    fn test_no_reviews_passes() {
        let verdict = ReviewGate::evaluate(&[], 80.0);
        assert!(verdict.passed);
        assert_eq!(verdict.message, "No skills to review");
    }

    #[test]
    fn test_all_passing() {
        let reviews = vec![review("skills/a", true, 90), review("skills/b", true, 80)];
        let verdict = ReviewGate::evaluate(&reviews, 80.0);
        assert!(verdict.passed);
        assert!(verdict.violations.is_empty());
        assert!(verdict.message.contains("All 2"));
    }

    #[test]
    fn test_undetermined_does_not_fail() {
        let reviews = vec![SkillReview {
            path: PathBuf::from("skills/a"),
            result: ReviewResult::undetermined(String::new()),
        }];
        assert!(ReviewGate::evaluate(&reviews, 80.0).passed);
    }

    #[test]
    fn test_one_failure_fails_gate() {
        let reviews = vec![review("skills/a", true, 95), review("skills/b", false, 60)];
        let verdict = ReviewGate::evaluate(&reviews, 80.0);
        assert!(!verdict.passed);
        assert_eq!(verdict.violations.len(), 1);
        assert!(verdict.violations[0].contains("skills/b"));
        assert!(verdict.violations[0].contains("60/100"));
        assert!(verdict.message.contains("1 of 2"));
    }
}
