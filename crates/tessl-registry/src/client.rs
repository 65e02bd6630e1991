//! Tessl registry HTTP client
//!
//! Thin typed wrapper over the registry REST API. Error responses follow the
//! JSON:API convention (`{"errors": [{"status", "title", "detail"}]}`) and
//! are surfaced as `[<status> <title>]: <detail>`.

use crate::error::RegistryError;
use crate::registry::TileRegistry;
use crate::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tile_core::{TileId, ARCHIVE_MEDIA_TYPE};
use tracing::{debug, info};

/// Default registry endpoint.
pub const DEFAULT_API_URL: &str = "https://api.tessl.io";

/// Header carrying the CI identity token on uploads.
pub const OIDC_TOKEN_HEADER: &str = "GitHub-OIDC-Token";

/// Registry client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// API base URL
    pub base_url: String,
    /// Bearer token attached to read requests (optional for public tiles)
    pub token: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

impl RegistryConfig {
    /// Config for a specific server
    pub fn new(base_url: &str) -> Self {
        RegistryConfig {
            base_url: base_url.to_string(),
            token: None,
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

/// Registry client bound to one base URL
pub struct RegistryClient {
    config: RegistryConfig,
    base_url: Url,
    http_client: reqwest::Client,
}

impl RegistryClient {
    /// Create a new registry client
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            RegistryError::InvalidConfig(format!("invalid base URL {}: {}", config.base_url, e))
        })?;

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("tile-publish/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(RegistryClient {
            config,
            base_url,
            http_client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RegistryError::InvalidConfig(format!(
                    "base URL {} cannot carry a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// List the versions published for a tile.
    ///
    /// A 404 means the tile does not exist yet and yields an empty list.
    pub async fn list_versions(&self, tile: &TileId) -> Result<Vec<String>> {
        let url = self.endpoint(&["v1", "tiles", &tile.workspace, &tile.tile, "versions"])?;
        debug!(%url, "Fetching tile versions");

        let mut request = self.http_client.get(url.clone());
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!(tile = %tile, "Tile not found, treating as unpublished");
            return Ok(Vec::new());
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &body).unwrap_or(RegistryError::Unknown {
                status: status.as_u16(),
            }));
        }

        let versions: VersionsResponse =
            serde_json::from_str(&body).map_err(|e| RegistryError::InvalidResponse {
                endpoint: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(versions
            .data
            .into_iter()
            .map(|v| v.attributes.version)
            .collect())
    }

    /// Upload a tile archive.
    pub async fn upload(&self, archive: Vec<u8>, api_token: &str, oidc_token: &str) -> Result<()> {
        let url = self.endpoint(&["v1", "tiles"])?;
        info!(bytes = archive.len(), "Publishing to Tessl API...");

        let response = self
            .http_client
            .post(url)
            .bearer_auth(api_token)
            .header(OIDC_TOKEN_HEADER, oidc_token)
            .header(CONTENT_TYPE, ARCHIVE_MEDIA_TYPE)
            .body(archive)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body).unwrap_or_else(|| RegistryError::UnexpectedResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        }))
    }
}

#[async_trait]
impl TileRegistry for RegistryClient {
    async fn list_versions(&self, tile: &TileId) -> Result<Vec<String>> {
        RegistryClient::list_versions(self, tile).await
    }

    async fn upload(&self, archive: Vec<u8>, api_token: &str, oidc_token: &str) -> Result<()> {
        RegistryClient::upload(self, archive, api_token, oidc_token).await
    }
}

#[derive(Debug, Deserialize)]
struct VersionsResponse {
    data: Vec<VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    attributes: VersionAttributes,
}

#[derive(Debug, Deserialize)]
struct VersionAttributes {
    version: String,
}

#[derive(Debug, Deserialize)]
struct ErrorDocument {
    errors: Vec<ErrorObject>,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    status: Option<Value>,
    title: Option<String>,
    detail: Option<String>,
}

/// Decode the first entry of a JSON:API error document.
///
/// Returns `None` when the body is not such a document, so callers can pick
/// their own fallback.
fn api_error(status: StatusCode, body: &str) -> Option<RegistryError> {
    let document: ErrorDocument = serde_json::from_str(body).ok()?;
    let first = document.errors.into_iter().next()?;
    if first.title.is_none() && first.detail.is_none() {
        return None;
    }

    let status_text = match first.status {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => status.as_u16().to_string(),
    };

    Some(RegistryError::Api {
        status: status_text,
        title: first
            .title
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Error").to_string()),
        detail: first.detail.unwrap_or_default(),
    })
}
