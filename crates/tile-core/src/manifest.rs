//! Tile manifest (`tile.json`) loading and tile identifiers.

use crate::error::{Result, TileError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// File name of the manifest at the root of every tile.
pub const MANIFEST_FILE: &str = "tile.json";

/// The subset of `tile.json` the publish pipeline relies on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TileManifest {
    /// Full tile name, `workspace/tile`.
    pub name: String,

    /// Version string to publish.
    pub version: String,
}

impl TileManifest {
    /// Read and validate `<root>/tile.json`.
    ///
    /// Missing file, invalid JSON, and a missing `name` or `version` each
    /// produce a distinct error.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TileError::ManifestNotFound(path));
            }
            Err(e) => return Err(e.into()),
        };

        let value: Value = serde_json::from_slice(&raw)
            .map_err(|source| TileError::ManifestInvalidJson { path, source })?;

        Self::from_value(&value)
    }

    /// Extract the manifest fields from an already-parsed JSON document.
    pub fn from_value(value: &Value) -> Result<Self> {
        let name = string_field(value, "name")?;
        let version = string_field(value, "version")?;
        Ok(Self { name, version })
    }
}

fn string_field(value: &Value, field: &'static str) -> Result<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(TileError::ManifestMissingField(field))
}

/// A tile's registry coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileId {
    pub workspace: String,
    pub tile: String,
}

impl TileId {
    /// Parse `workspace/tile`. Both halves must be non-empty and the tile half
    /// must not contain another `/`.
    pub fn parse(full_name: &str) -> Result<Self> {
        match full_name.split_once('/') {
            Some((workspace, tile))
                if !workspace.is_empty() && !tile.is_empty() && !tile.contains('/') =>
            {
                Ok(Self {
                    workspace: workspace.to_string(),
                    tile: tile.to_string(),
                })
            }
            _ => Err(TileError::InvalidTileName(full_name.to_string())),
        }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.workspace, self.tile)
    }
}
