// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for the Tether plugin runtime.
//!
//! Each concern (manifest parsing, discovery, lifecycle, guarded access,
//! capability resolution, channel bridging) has its own enum. [`TetherError`]
//! wraps all of them for call sites that cross concerns.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::{CapabilityType, PluginStatus};

/// Boxed foreign error carried as the source of hook, selector, and loader failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures while reading or validating a `manifest.json` declaration file.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read (missing, permissions, not UTF-8).
    #[error("cannot read plugin manifest {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not a JSON object or a field has the wrong type.
    #[error("malformed plugin manifest {}: {detail}", path.display())]
    Malformed { path: PathBuf, detail: String },

    /// One or more required fields are absent. Lists every missing field.
    #[error("plugin manifest {} is missing required fields: {}", path.display(), fields.join(", "))]
    MissingFields { path: PathBuf, fields: Vec<String> },
}

/// Failures while turning a plugin directory into a registry record.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The plugin (or plugins root) directory does not exist.
    #[error("plugin directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// The directory has no manifest file (fatal only in strict mode).
    #[error("no plugin manifest in {}, is this a plugin directory?", path.display())]
    ManifestNotFound { path: PathBuf },

    /// The manifest's `main` does not point at an existing file.
    #[error("entry point for plugin `{plugin}` not found: {}", path.display())]
    EntryPointNotFound { plugin: String, path: PathBuf },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Directory listing failed.
    #[error("failed to scan {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the `ready -> loaded` transition.
#[derive(Debug, Error)]
pub enum PluginLoadError {
    /// `load` was requested for a record that is not `ready`.
    #[error("plugin `{plugin}` is {status}, only ready plugins can be loaded")]
    NotReady { plugin: String, status: PluginStatus },

    /// The module loader could not resolve or execute the entry point.
    #[error("failed to load entry point {} of plugin `{plugin}`: {source}", path.display())]
    EntryPoint {
        plugin: String,
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// The entry point has no default export.
    #[error("entry point {} of plugin `{plugin}` has no default export", path.display())]
    NoDefaultExport { plugin: String, path: PathBuf },

    /// The default export is not a plugin module object.
    #[error("entry point {} of plugin `{plugin}` exports {found}, expected a module object", path.display())]
    InvalidExportShape {
        plugin: String,
        path: PathBuf,
        found: String,
    },

    /// The module's mount hook returned an error.
    #[error("mount hook of plugin `{plugin}` failed: {source}")]
    MountFailed {
        plugin: String,
        #[source]
        source: BoxError,
    },

    /// A lifecycle hook did not complete within the configured timeout.
    #[error("{hook} hook of plugin `{plugin}` timed out after {duration:?}")]
    Timeout {
        plugin: String,
        hook: &'static str,
        duration: Duration,
    },
}

/// Failures of guarded member access through a plugin's access proxy.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The plugin is not loaded, so its members cannot be used.
    #[error("plugin `{plugin}` is {status}, its members cannot be accessed")]
    InvalidState { plugin: String, status: PluginStatus },

    /// The module has no member with this name.
    #[error("plugin `{plugin}` has no member `{member}`")]
    NoSuchMember { plugin: String, member: String },

    /// The member exists but the invocation itself failed.
    #[error("call to `{member}` on plugin `{plugin}` failed: {source}")]
    Invocation {
        plugin: String,
        member: String,
        #[source]
        source: BoxError,
    },
}

/// Failures of capability resolution.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no plugins registered for capability type `{capability}`")]
    NoProvidersForType { capability: CapabilityType },

    #[error("provider selector for `{capability}` failed: {source}")]
    SelectorFailed {
        capability: CapabilityType,
        #[source]
        source: BoxError,
    },

    #[error("no suitable plugin for capability type `{capability}`")]
    NoMatchingProvider { capability: CapabilityType },

    /// More than one provider remained after selection.
    #[error("ambiguous providers for capability type `{capability}`: {}", candidates.join(", "))]
    AmbiguousProviders {
        capability: CapabilityType,
        candidates: Vec<String>,
    },

    /// The selected provider could not be loaded.
    #[error(transparent)]
    Load(#[from] PluginLoadError),
}

/// Failures on the cross-process channel bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The host did not answer the remote-context id query.
    #[error("could not obtain remote context id from host: {source}")]
    ContextUnavailable {
        #[source]
        source: BoxError,
    },

    #[error("remote context id query timed out after {duration:?}")]
    Timeout { duration: Duration },
}

/// Umbrella error for operations that cross concerns.
#[derive(Debug, Error)]
pub enum TetherError {
    /// Configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Load(#[from] PluginLoadError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// Errors raised by plugin module code (hooks, member calls).
    #[error("plugin error: {message}")]
    Module {
        message: String,
        source: Option<BoxError>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TetherError {
    /// Shorthand for a module-originated error without a source.
    pub fn module(message: impl Into<String>) -> Self {
        TetherError::Module {
            message: message.into(),
            source: None,
        }
    }
}
