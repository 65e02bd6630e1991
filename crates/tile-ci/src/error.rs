//! Error taxonomy for the publish pipeline.

use tessl_registry::RegistryError;
use tile_core::TileError;

/// Errors that abort a publish run.
///
/// Tile and registry errors are passed through unchanged so their messages
/// reach the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Tile(#[from] TileError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Invalid review threshold: {0}. Must be 0-100")]
    InvalidThreshold(String),

    #[error("Invalid max iterations: {0}. Must be 1-10")]
    InvalidMaxIterations(String),

    #[error("Skill review failed: {failed} skill(s) scored below the threshold of {threshold}")]
    ReviewFailed {
        failed: usize,
        threshold: f64,
        violations: Vec<String>,
    },

    #[error("Failed to install tessl CLI (exit code {exit_code})")]
    InstallFailed { exit_code: i32 },

    #[error("process error: {0}")]
    Process(String),

    #[error("background task failed: {0}")]
    Task(String),
}

/// Result type for publish operations.
pub type Result<T> = std::result::Result<T, PublishError>;
