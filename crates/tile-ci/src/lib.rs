//! Tile CI - publish tiles from a CI job
//!
//! Provides the publish pipeline that:
//! - Loads `tile.json` and skips versions the registry already has
//! - Optionally gates the upload on a `tessl skill review` of every skill
//! - Archives the tile and uploads it with CI identity attached

pub mod error;
pub mod gate;
pub mod install;
pub mod pipeline;
pub mod review;
pub mod runner;
pub mod skills;
pub mod version_check;

// Re-export key types
pub use error::{PublishError, Result};
pub use gate::{ReviewGate, ReviewVerdict};
pub use install::{install_with, InstallStatus, INSTALL_SCRIPT};
pub use pipeline::{PublishOutcome, PublishPipeline};
pub use review::{
    format_review_results, parse_max_iterations, parse_review_output, parse_threshold,
    review_command, ReviewResult, ReviewSettings, SkillReview, SkillReviewer, TesslReviewer,
    DEFAULT_REVIEWER, SCORE_UNDETERMINED,
};
pub use runner::{CommandSpec, ProcessOutput, ProcessRunner};
pub use skills::{discover_skills, has_skills, SKILL_FILE};
pub use version_check::{is_published, is_published_version, VersionCheck};
