// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so that typos in
//! `tether.toml` are reported at startup instead of silently ignored.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Tether configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TetherConfig {
    /// Process-level settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Plugin discovery and lifecycle settings.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Channel bridge settings.
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Plugin discovery and lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Directories scanned for plugins, one subdirectory per plugin.
    #[serde(default = "default_plugin_directories")]
    pub directories: Vec<PathBuf>,

    /// Treat a plugin directory without a manifest as an error.
    /// Only applies to single-plugin discovery; directory scans always skip.
    #[serde(default)]
    pub strict: bool,

    /// Upper bound for mount and unmount hooks, in seconds.
    #[serde(default = "default_hook_timeout_secs")]
    pub hook_timeout_secs: u64,
}

impl PluginsConfig {
    pub fn hook_timeout(&self) -> Duration {
        Duration::from_secs(self.hook_timeout_secs)
    }
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            directories: default_plugin_directories(),
            strict: false,
            hook_timeout_secs: default_hook_timeout_secs(),
        }
    }
}

fn default_plugin_directories() -> Vec<PathBuf> {
    vec![PathBuf::from("plugins")]
}

fn default_hook_timeout_secs() -> u64 {
    30
}

/// Channel bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// How long a remote context waits for the host to report its id, in seconds.
    #[serde(default = "default_context_query_timeout_secs")]
    pub context_query_timeout_secs: u64,
}

impl BridgeConfig {
    pub fn context_query_timeout(&self) -> Duration {
        Duration::from_secs(self.context_query_timeout_secs)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            context_query_timeout_secs: default_context_query_timeout_secs(),
        }
    }
}

fn default_context_query_timeout_secs() -> u64 {
    5
}
