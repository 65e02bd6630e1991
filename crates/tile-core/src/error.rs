//! Domain-level error taxonomy for tile handling.

use std::path::PathBuf;

/// Errors produced while loading a tile or building its archive.
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    #[error("tile.json not found at {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("tile.json at {} is not valid JSON", .path.display())]
    ManifestInvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("tile.json is missing required string field '{0}'")]
    ManifestMissingField(&'static str),

    #[error("Invalid tile name '{0}'. Expected format 'workspace/tile'")]
    InvalidTileName(String),

    #[error("No files found in path: {}", .path.display())]
    NoMatchingFiles { path: PathBuf },

    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<walkdir::Error> for TileError {
    fn from(err: walkdir::Error) -> Self {
        TileError::Io(err.into())
    }
}

/// Result type for tile operations.
pub type Result<T> = std::result::Result<T, TileError>;
