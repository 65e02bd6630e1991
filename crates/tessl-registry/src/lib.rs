//! Tessl Registry: typed access to the tile registry API
//!
//! This crate is the only place that talks HTTP:
//!
//! - `RegistryClient`: list tile versions, upload archives
//! - `GithubOidcProvider`: CI identity tokens for upload provenance
//! - `TileRegistry` / `IdTokenProvider`: seams used by the publish pipeline
//! - `fakes`: in-memory implementations for tests

pub mod client;
pub mod error;
pub mod fakes;
pub mod oidc;
pub mod registry;

pub use client::{RegistryClient, RegistryConfig, DEFAULT_API_URL, OIDC_TOKEN_HEADER};
pub use error::RegistryError;
pub use oidc::{GithubEnvOidc, GithubOidcProvider, REGISTRY_AUDIENCE};
pub use registry::{IdTokenProvider, TileRegistry};

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
