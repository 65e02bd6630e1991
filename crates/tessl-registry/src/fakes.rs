//! In-memory fakes for the registry traits (testing only)
//!
//! `MemoryRegistry` records every call so tests can assert on what the
//! pipeline sent without an HTTP server.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tile_core::TileId;

use crate::error::RegistryError;
use crate::registry::{IdTokenProvider, TileRegistry};
use crate::Result;

/// One captured upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub archive: Vec<u8>,
    pub api_token: String,
    pub oidc_token: String,
}

#[derive(Debug, Clone)]
struct ApiFailure {
    status: String,
    title: String,
    detail: String,
}

impl ApiFailure {
    fn to_error(&self) -> RegistryError {
        RegistryError::Api {
            status: self.status.clone(),
            title: self.title.clone(),
            detail: self.detail.clone(),
        }
    }
}

/// In-memory registry backed by a `HashMap<tile, versions>`.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    versions: Mutex<HashMap<String, Vec<String>>>,
    uploads: Mutex<Vec<UploadRecord>>,
    list_calls: Mutex<usize>,
    list_failure: Mutex<Option<ApiFailure>>,
    upload_failure: Mutex<Option<ApiFailure>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed published versions for `tile` (`workspace/tile`).
    pub fn with_versions(self, tile: &str, versions: &[&str]) -> Self {
        self.versions.lock().unwrap().insert(
            tile.to_string(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// Make every `list_versions` call fail with an API error.
    pub fn fail_listing(self, status: &str, title: &str, detail: &str) -> Self {
        *self.list_failure.lock().unwrap() = Some(ApiFailure {
            status: status.to_string(),
            title: title.to_string(),
            detail: detail.to_string(),
        });
        self
    }

    /// Make every upload fail with an API error.
    pub fn fail_uploads(self, status: &str, title: &str, detail: &str) -> Self {
        *self.upload_failure.lock().unwrap() = Some(ApiFailure {
            status: status.to_string(),
            title: title.to_string(),
            detail: detail.to_string(),
        });
        self
    }

    /// Uploads received so far, including rejected ones.
    pub fn uploads(&self) -> Vec<UploadRecord> {
        self.uploads.lock().unwrap().clone()
    }

    /// Number of `list_versions` calls received.
    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }
}

#[async_trait]
impl TileRegistry for MemoryRegistry {
    async fn list_versions(&self, tile: &TileId) -> Result<Vec<String>> {
        *self.list_calls.lock().unwrap() += 1;
        if let Some(failure) = self.list_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }
        let versions = self.versions.lock().unwrap();
        Ok(versions.get(&tile.to_string()).cloned().unwrap_or_default())
    }

    async fn upload(&self, archive: Vec<u8>, api_token: &str, oidc_token: &str) -> Result<()> {
        self.uploads.lock().unwrap().push(UploadRecord {
            archive,
            api_token: api_token.to_string(),
            oidc_token: oidc_token.to_string(),
        });
        match self.upload_failure.lock().unwrap().as_ref() {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

/// Identity provider that always hands out the same token.
#[derive(Debug, Clone)]
pub struct StaticIdToken(pub String);

impl StaticIdToken {
    pub fn new(token: &str) -> Self {
        Self(token.to_string())
    }
}

#[async_trait]
impl IdTokenProvider for StaticIdToken {
    async fn id_token(&self, _audience: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}
