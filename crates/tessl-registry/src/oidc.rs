//! GitHub Actions OIDC identity tokens.
//!
//! Jobs granted `id-token: write` receive a request URL and bearer token in
//! their environment; exchanging them yields a short-lived JWT that the
//! registry uses for upload provenance.

use crate::error::RegistryError;
use crate::registry::IdTokenProvider;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Audience the registry expects in upload identity tokens.
pub const REGISTRY_AUDIENCE: &str = "api.tessl.io";

const REQUEST_URL_ENV: &str = "ACTIONS_ID_TOKEN_REQUEST_URL";
const REQUEST_TOKEN_ENV: &str = "ACTIONS_ID_TOKEN_REQUEST_TOKEN";

/// Identity token provider backed by the GitHub Actions token service.
pub struct GithubOidcProvider {
    request_url: String,
    request_token: String,
    http_client: reqwest::Client,
}

impl GithubOidcProvider {
    /// Create a provider for an explicit token endpoint.
    pub fn new(request_url: &str, request_token: &str) -> Self {
        GithubOidcProvider {
            request_url: request_url.to_string(),
            request_token: request_token.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Create a provider from the variables GitHub Actions injects.
    pub fn from_env() -> Result<Self> {
        let request_url = env_var(REQUEST_URL_ENV)?;
        let request_token = env_var(REQUEST_TOKEN_ENV)?;
        Ok(Self::new(&request_url, &request_token))
    }
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| {
        RegistryError::OidcUnavailable(format!(
            "{} is not set; the workflow needs `permissions: id-token: write`",
            name
        ))
    })
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    value: Option<String>,
}

#[async_trait]
impl IdTokenProvider for GithubOidcProvider {
    async fn id_token(&self, audience: &str) -> Result<String> {
        debug!(audience = %audience, "Requesting OIDC token");

        let response = self
            .http_client
            .get(&self.request_url)
            .query(&[("audience", audience)])
            .bearer_auth(&self.request_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::OidcUnavailable(format!(
                "token service returned HTTP {}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = response.json().await?;
        token
            .value
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RegistryError::OidcUnavailable("token service returned no value".into()))
    }
}

/// Provider that reads the GitHub Actions environment only when a token is
/// requested, so runs that never upload do not need OIDC permissions.
#[derive(Debug, Default, Clone, Copy)]
pub struct GithubEnvOidc;

#[async_trait]
impl IdTokenProvider for GithubEnvOidc {
    async fn id_token(&self, audience: &str) -> Result<String> {
        GithubOidcProvider::from_env()?.id_token(audience).await
    }
}
