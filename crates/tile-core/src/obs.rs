//! Structured observability hooks for the publish lifecycle.
//!
//! Every pipeline transition is emitted as an `info!` event with a stable
//! `event` field so CI logs can be grepped or shipped as JSON.

use tracing::{info, Span};

/// Span covering one publish run, tagged with the tile root.
///
/// Attach it with `tracing::Instrument` so it follows the future across
/// await points.
pub fn publish_span(root: &str) -> Span {
    tracing::info_span!("tile.publish", root = %root)
}

/// Emit event: manifest loaded, publish starting.
pub fn emit_publish_started(tile: &str, version: &str) {
    info!(event = "publish.started", tile = %tile, version = %version);
}

/// Emit event: remote versions fetched and membership decided.
pub fn emit_version_checked(tile: &str, version: &str, existing: usize, published: bool) {
    info!(
        event = "publish.version_checked",
        tile = %tile,
        version = %version,
        existing_versions = existing,
        already_published = published,
    );
}

/// Emit event: version already present remotely, nothing to do.
pub fn emit_publish_skipped(tile: &str, version: &str) {
    info!(
        event = "publish.skipped",
        tile = %tile,
        version = %version,
        "Version {} of {} is already published, skipping",
        version,
        tile
    );
}

/// Emit event: one skill reviewed. A score of `-1` means undetermined.
pub fn emit_review_completed(skill: &str, score: i32, threshold: f64, passed: bool) {
    info!(
        event = "review.completed",
        skill = %skill,
        score = score,
        threshold = threshold,
        passed = passed,
    );
}

/// Emit event: archive serialised.
pub fn emit_archive_built(files: usize, bytes: usize, digest: &str) {
    info!(
        event = "archive.built",
        files = files,
        bytes = bytes,
        sha256 = %digest,
        "Archive created ({} bytes)",
        bytes
    );
}

/// Emit event: archive accepted by the registry.
pub fn emit_publish_uploaded(tile: &str, version: &str, bytes: usize) {
    info!(
        event = "publish.uploaded",
        tile = %tile,
        version = %version,
        bytes = bytes,
        "Published {}@{}",
        tile,
        version
    );
}
