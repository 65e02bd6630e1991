//! Error types for tessl-registry

use thiserror::Error;

/// Errors that can occur talking to the registry or the identity provider.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Structured API error (`errors[0]` of a JSON:API error document)
    #[error("[{status} {title}]: {detail}")]
    Api {
        status: String,
        title: String,
        detail: String,
    },

    /// Error status without a usable error document
    #[error("Unknown error (HTTP {status})")]
    Unknown { status: u16 },

    /// Upload rejected with a body that is not an error document
    #[error("API request failed: {status} {reason}\n{body}")]
    UnexpectedResponse {
        status: u16,
        reason: String,
        body: String,
    },

    /// Response body could not be decoded
    #[error("Invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },

    /// Client configuration cannot be used
    #[error("Invalid registry configuration: {0}")]
    InvalidConfig(String),

    /// CI identity token could not be obtained
    #[error("OIDC token unavailable: {0}")]
    OidcUnavailable(String),

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        RegistryError::Http(err.to_string())
    }
}
