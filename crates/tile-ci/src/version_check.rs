//! Registry version uniqueness check.

use crate::error::Result;
use tessl_registry::TileRegistry;
use tile_core::TileId;

/// Whether `version` appears in `existing`. Comparison is exact.
pub fn is_published(existing: &[String], version: &str) -> bool {
    existing.iter().any(|v| v == version)
}

/// Result of asking the registry about one tile version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCheck {
    /// Parsed registry coordinates of the tile.
    pub tile: TileId,
    /// Number of versions the registry already holds.
    pub existing_versions: usize,
    /// Whether the queried version is among them.
    pub published: bool,
}

/// Ask the registry whether `name@version` is already published.
///
/// The name is validated before any request. A tile the registry has never
/// seen counts as unpublished.
pub async fn is_published_version(
    registry: &dyn TileRegistry,
    name: &str,
    version: &str,
) -> Result<VersionCheck> {
    let tile = TileId::parse(name)?;
    let existing = registry.list_versions(&tile).await?;
    Ok(VersionCheck {
        published: is_published(&existing, version),
        existing_versions: existing.len(),
        tile,
    })
}
