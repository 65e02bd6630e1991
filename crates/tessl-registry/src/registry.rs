//! Trait seams between the publish pipeline and remote services.
//!
//! The pipeline only talks to these traits so tests can swap in the
//! in-memory implementations from [`crate::fakes`].

use async_trait::async_trait;
use tile_core::TileId;

use crate::Result;

/// Remote tile registry.
#[async_trait]
pub trait TileRegistry: Send + Sync {
    /// Version strings already published for `tile`. A tile that does not
    /// exist yet has no versions.
    async fn list_versions(&self, tile: &TileId) -> Result<Vec<String>>;

    /// Upload a compressed tile archive. Single attempt, no retries.
    async fn upload(&self, archive: Vec<u8>, api_token: &str, oidc_token: &str) -> Result<()>;
}

/// Source of short-lived CI identity tokens.
#[async_trait]
pub trait IdTokenProvider: Send + Sync {
    /// Issue a token scoped to `audience`.
    async fn id_token(&self, audience: &str) -> Result<String>;
}
