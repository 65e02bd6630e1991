//! Skill quality review through the external `tessl` CLI.
//!
//! The reviewer is best-effort: if the tool is missing, crashes, or prints
//! something unexpected, the skill passes with an undetermined score. Only a
//! determined score below the threshold fails the review.
//!
//! Output contract: stdout holds optional preamble text followed by one JSON
//! object; the score is read from `contentJudge.normalizedScore` (0–1) and
//! reported on a 0–100 scale.

use crate::error::{PublishError, Result};
use crate::install::install_with;
use crate::runner::{CommandSpec, ProcessRunner};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Sentinel score for reviews whose outcome could not be determined.
pub const SCORE_UNDETERMINED: i32 = -1;

/// Reviewer executable used when none is configured.
pub const DEFAULT_REVIEWER: &str = "tessl";

pub const DEFAULT_THRESHOLD: f64 = 80.0;
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

const SCORE_POINTER: &str = "/contentJudge/normalizedScore";

/// Outcome of reviewing one skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub passed: bool,
    /// 0–100, or [`SCORE_UNDETERMINED`].
    pub score: i32,
    pub raw_output: String,
}

impl ReviewResult {
    /// A soft failure: passes, score unknown.
    pub fn undetermined(raw_output: String) -> Self {
        Self {
            passed: true,
            score: SCORE_UNDETERMINED,
            raw_output,
        }
    }

    pub fn is_undetermined(&self) -> bool {
        self.score == SCORE_UNDETERMINED
    }
}

/// A review result paired with the skill it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillReview {
    pub path: PathBuf,
    pub result: ReviewResult,
}

/// Review gate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSettings {
    /// Minimum passing score, 0–100.
    pub threshold: f64,
    /// Let the reviewer rewrite the skill to improve it.
    pub optimize: bool,
    /// Optimisation rounds, 1–10.
    pub max_iterations: u32,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            optimize: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ReviewSettings {
    /// Build settings from raw user inputs, validating each one.
    pub fn from_inputs(
        threshold: Option<&str>,
        optimize: bool,
        max_iterations: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            threshold: parse_threshold(threshold)?,
            optimize,
            max_iterations: parse_max_iterations(max_iterations)?,
        })
    }
}

/// Parse a review threshold. Defaults to 80; must be a number in [0, 100].
pub fn parse_threshold(value: Option<&str>) -> Result<f64> {
    let Some(raw) = value else {
        return Ok(DEFAULT_THRESHOLD);
    };

    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && (0.0..=100.0).contains(&n) => Ok(n),
        _ => Err(PublishError::InvalidThreshold(raw.to_string())),
    }
}

/// Parse the optimisation iteration cap. Defaults to 3; must be an integer
/// in [1, 10].
pub fn parse_max_iterations(value: Option<&str>) -> Result<u32> {
    let Some(raw) = value else {
        return Ok(DEFAULT_MAX_ITERATIONS);
    };

    match raw.trim().parse::<u32>() {
        Ok(n) if (1..=10).contains(&n) => Ok(n),
        _ => Err(PublishError::InvalidMaxIterations(raw.to_string())),
    }
}

/// Arguments for one reviewer invocation.
pub fn review_command(tool: &str, skill_path: &Path, settings: &ReviewSettings) -> Vec<String> {
    let mut command = vec![
        tool.to_string(),
        "skill".to_string(),
        "review".to_string(),
        "--json".to_string(),
    ];

    if settings.optimize {
        command.extend([
            "--yes".to_string(),
            "--optimize".to_string(),
            "--max-iterations".to_string(),
            settings.max_iterations.to_string(),
        ]);
    }

    command.push(skill_path.to_string_lossy().to_string());
    command
}

/// Extract the 0–100 score from reviewer stdout.
///
/// Parses from the first `{` to the end of the output. Returns `None` when
/// there is no JSON, it does not parse, or the score is missing, non-numeric
/// or outside 0–1.
pub fn parse_review_output(stdout: &str) -> Option<i32> {
    let start = stdout.find('{')?;
    let value: Value = serde_json::from_str(&stdout[start..]).ok()?;

    let normalized = value.pointer(SCORE_POINTER)?.as_f64()?;
    if !normalized.is_finite() || !(0.0..=1.0).contains(&normalized) {
        return None;
    }

    Some((normalized * 100.0).round() as i32)
}

/// Human-readable summary of one review.
pub fn format_review_results(result: &ReviewResult, threshold: f64) -> String {
    let status = if result.passed { "PASSED" } else { "FAILED" };
    let mut lines = vec![format!("Skill Review: {}", status)];

    if result.is_undetermined() {
        lines.push("  Score: unavailable (review could not be completed)".to_string());
    } else {
        lines.push(format!(
            "  Score: {}/100 (threshold: {})",
            result.score, threshold
        ));
    }

    if !result.passed {
        lines.push(
            "  Run `tessl skill review --optimize` locally to improve the skill.".to_string(),
        );
    }

    lines.join("\n")
}

/// Something that can score a skill directory.
#[async_trait]
pub trait SkillReviewer: Send + Sync {
    /// Minimum passing score this reviewer applies.
    fn threshold(&self) -> f64;

    /// Get the reviewer ready to run. Called once per publish, only when
    /// there are skills to review. Problems are logged, never returned.
    async fn prepare(&self) {}

    /// Review one skill. Never fails; environmental problems yield an
    /// undetermined result.
    async fn review(&self, skill_path: &Path) -> ReviewResult;
}

/// Reviewer that shells out to `tessl skill review`.
#[derive(Debug, Clone)]
pub struct TesslReviewer {
    tool: String,
    settings: ReviewSettings,
    install_script: Option<String>,
}

impl TesslReviewer {
    /// Reviewer backed by the `tool` executable, looked up on `PATH` unless it
    /// is a path.
    pub fn with_tool(tool: &str, settings: ReviewSettings) -> Self {
        Self {
            tool: tool.to_string(),
            settings,
            install_script: None,
        }
    }

    /// Run `install_script` in [`SkillReviewer::prepare`] when the tool is
    /// missing.
    pub fn with_install(mut self, install_script: &str) -> Self {
        self.install_script = Some(install_script.to_string());
        self
    }
}

#[async_trait]
impl SkillReviewer for TesslReviewer {
    fn threshold(&self) -> f64 {
        self.settings.threshold
    }

    async fn prepare(&self) {
        let Some(script) = &self.install_script else {
            return;
        };
        if let Err(e) = install_with(&self.tool, script).await {
            warn!(tool = %self.tool, error = %e, "Reviewer install failed, reviews will be skipped");
        }
    }

    async fn review(&self, skill_path: &Path) -> ReviewResult {
        let spec = CommandSpec::captured(
            "skill_review",
            review_command(&self.tool, skill_path, &self.settings),
        );
        debug!(command = ?spec.command, "Running skill review");

        let output = match ProcessRunner::execute(&spec).await {
            Ok(output) => output,
            Err(e) => {
                warn!(skill = %skill_path.display(), error = %e, "Skill review could not run, skipping gate");
                return ReviewResult::undetermined(String::new());
            }
        };

        if !output.passed() {
            warn!(
                skill = %skill_path.display(),
                exit_code = output.exit_code,
                stderr = %output.stderr.trim(),
                "Skill review failed to complete, skipping gate"
            );
            return ReviewResult::undetermined(output.stdout);
        }

        match parse_review_output(&output.stdout) {
            Some(score) => ReviewResult {
                passed: f64::from(score) >= self.settings.threshold,
                score,
                raw_output: output.stdout,
            },
            None => {
                warn!(
                    skill = %skill_path.display(),
                    "Could not read a score from skill review output, skipping gate"
                );
                ReviewResult::undetermined(output.stdout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_threshold_default() {
        assert_eq!(parse_threshold(None).unwrap(), 80.0);
    }

    #[test]
    fn test_parse_threshold_valid() {
        assert_eq!(parse_threshold(Some("90")).unwrap(), 90.0);
        assert_eq!(parse_threshold(Some("0")).unwrap(), 0.0);
        assert_eq!(parse_threshold(Some("100")).unwrap(), 100.0);
        assert_eq!(parse_threshold(Some("72.5")).unwrap(), 72.5);
    }

    #[test]
    fn test_parse_threshold_invalid() {
        for raw in ["abc", "-1", "101", "", "NaN", "inf"] {
            let err = parse_threshold(Some(raw)).unwrap_err();
            assert!(
                err.to_string().contains("Invalid review threshold"),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_threshold_round_trip_is_stable() {
        for raw in ["0", "50", "72.5", "80", "99.99", "100"] {
            let once = parse_threshold(Some(raw)).unwrap();
            let twice = parse_threshold(Some(&once.to_string())).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_parse_max_iterations() {
        assert_eq!(parse_max_iterations(None).unwrap(), 3);
        assert_eq!(parse_max_iterations(Some("1")).unwrap(), 1);
        assert_eq!(parse_max_iterations(Some("10")).unwrap(), 10);
        for raw in ["0", "11", "2.5", "many"] {
            let err = parse_max_iterations(Some(raw)).unwrap_err();
            assert!(err.to_string().contains("Invalid max iterations"));
        }
    }

    #[test]
    fn test_settings_from_inputs() {
        let settings = ReviewSettings::from_inputs(Some("70"), true, Some("5")).unwrap();
        assert_eq!(settings.threshold, 70.0);
        assert!(settings.optimize);
        assert_eq!(settings.max_iterations, 5);

        assert!(ReviewSettings::from_inputs(Some("200"), false, None).is_err());
    }

    #[test]
    fn test_review_command_plain() {
        let cmd = review_command("tessl", Path::new("/tmp/skill"), &ReviewSettings::default());
        assert_eq!(cmd, vec!["tessl", "skill", "review", "--json", "/tmp/skill"]);
    }

    #[test]
    fn test_review_command_optimize() {
        let settings = ReviewSettings {
            optimize: true,
            max_iterations: 4,
            ..ReviewSettings::default()
        };
        let cmd = review_command("tessl", Path::new("/tmp/skill"), &settings);
        assert_eq!(
            cmd,
            vec![
                "tessl",
                "skill",
                "review",
                "--json",
                "--yes",
                "--optimize",
                "--max-iterations",
                "4",
                "/tmp/skill"
            ]
        );
    }

    #[test]
    fn test_parse_review_output_scales_score() {
        let out = json!({ "contentJudge": { "normalizedScore": 0.85 } }).to_string();
        assert_eq!(parse_review_output(&out), Some(85));

        let out = json!({ "contentJudge": { "normalizedScore": 0.6 } }).to_string();
        assert_eq!(parse_review_output(&out), Some(60));

        let out = json!({ "contentJudge": { "normalizedScore": 0.876 } }).to_string();
        assert_eq!(parse_review_output(&out), Some(88));
    }

    #[test]
    fn test_parse_review_output_skips_preamble() {
        let out = format!(
            "By using Tessl, you agree to our Terms: https://tessl.io/policies/terms\n\n{}",
            json!({ "contentJudge": { "normalizedScore": 0.95 } })
        );
        assert_eq!(parse_review_output(&out), Some(95));
    }

    #[test]
    fn test_parse_review_output_rejects_unusable_output() {
        assert_eq!(parse_review_output("not json"), None);
        assert_eq!(parse_review_output("{ broken"), None);
        assert_eq!(parse_review_output(r#"{"score": 85}"#), None);
        assert_eq!(
            parse_review_output(r#"{"contentJudge": {"normalizedScore": "high"}}"#),
            None
        );
        assert_eq!(
            parse_review_output(r#"{"contentJudge": {"normalizedScore": 1.5}}"#),
            None
        );
    }

    #[test]
    fn test_format_passed() {
        let result = ReviewResult {
            passed: true,
            score: 85,
            raw_output: String::new(),
        };
        let output = format_review_results(&result, 80.0);
        assert!(output.contains("PASSED"));
        assert!(output.contains("85/100"));
        assert!(output.contains("threshold: 80"));
    }

    #[test]
    fn test_format_failed_suggests_optimize() {
        let result = ReviewResult {
            passed: false,
            score: 60,
            raw_output: String::new(),
        };
        let output = format_review_results(&result, 80.0);
        assert!(output.contains("FAILED"));
        assert!(output.contains("60/100"));
        assert!(output.contains("threshold: 80"));
        assert!(output.contains("tessl skill review --optimize"));
    }

    #[test]
    fn test_format_undetermined() {
        let output = format_review_results(&ReviewResult::undetermined(String::new()), 80.0);
        assert!(output.contains("PASSED"));
        assert!(output.contains("unavailable"));
    }
}
