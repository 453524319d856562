// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifest parsing from `manifest.json` files.
//!
//! A manifest declares the plugin's identity, its entry point, and the
//! capability type it provides. Validation reports every missing required
//! field at once so authors can fix a manifest in a single pass.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tether_core::{CapabilityType, ManifestError};

/// File name of the declaration file inside each plugin directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Fields every manifest must declare.
pub const REQUIRED_FIELDS: [&str; 5] = ["name", "main", "version", "description", "author"];

/// Parsed plugin manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Human-readable plugin name.
    pub name: String,
    /// Entry point, relative to the plugin directory.
    pub main: String,
    /// Version string, expected to be semver.
    pub version: String,
    pub description: String,
    pub author: String,
    /// Capability type the plugin provides (e.g. "executor").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub capability_type: Option<String>,
    /// URL patterns with `*` wildcards the plugin applies to.
    #[serde(rename = "match", default, skip_serializing_if = "Vec::is_empty")]
    pub match_patterns: Vec<String>,
    /// Instruction kinds (languages, commands) the plugin handles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instruct: Vec<String>,
}

impl PluginManifest {
    /// The capability type to index under; `generic` when undeclared.
    pub fn capability_type(&self) -> CapabilityType {
        match &self.capability_type {
            Some(ty) if !ty.is_empty() => CapabilityType::new(ty.clone()),
            _ => CapabilityType::generic(),
        }
    }

    /// The version parsed as semver, if it is valid semver.
    pub fn semver(&self) -> Option<semver::Version> {
        semver::Version::parse(&self.version).ok()
    }
}

/// Read and validate the manifest at `path`.
pub async fn load_manifest(path: &Path) -> Result<PluginManifest, ManifestError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ManifestError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
    parse_manifest(&content, path)
}

/// Parse and validate manifest JSON. `origin` is only used in error messages.
pub fn parse_manifest(content: &str, origin: &Path) -> Result<PluginManifest, ManifestError> {
    let malformed = |detail: String| ManifestError::Malformed {
        path: origin.to_path_buf(),
        detail,
    };

    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| malformed(e.to_string()))?;

    let Some(object) = value.as_object() else {
        return Err(malformed("expected a JSON object".to_string()));
    };

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !object.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ManifestError::MissingFields {
            path: origin.to_path_buf(),
            fields: missing,
        });
    }

    serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
}
