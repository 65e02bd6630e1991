//! Tile Core
//!
//! Domain types shared by the publish toolchain:
//!
//! - `TileManifest` / `TileId`: the `tile.json` contract
//! - `TileArchive`: file selection and tar.gz serialisation
//! - `telemetry` / `obs`: tracing setup and lifecycle events

pub mod archive;
pub mod error;
pub mod manifest;
pub mod obs;
pub mod telemetry;

pub use archive::{
    archive_digest, build_archive, is_hidden, TileArchive, ARCHIVE_EXTENSIONS, ARCHIVE_MEDIA_TYPE,
};
pub use error::{Result, TileError};
pub use manifest::{TileId, TileManifest, MANIFEST_FILE};
pub use obs::{
    emit_archive_built, emit_publish_skipped, emit_publish_started, emit_publish_uploaded,
    emit_review_completed, emit_version_checked, publish_span,
};
pub use telemetry::init_tracing;
