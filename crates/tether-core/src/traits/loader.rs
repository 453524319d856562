// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry-point loading capability implemented by the host.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TetherError;
use crate::traits::module::PluginModule;

/// Resolved entry point of a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Manifest name of the plugin owning this entry point.
    pub plugin: String,
    /// `main` as declared in the manifest, relative to the plugin directory.
    pub main: String,
    /// Absolute location of the entry point.
    pub path: PathBuf,
}

/// A value exported by an entry point.
pub enum ExportValue {
    /// A module object the runtime can mount.
    Module(Arc<dyn PluginModule>),
    /// Plain data, which cannot be mounted.
    Data(serde_json::Value),
}

impl ExportValue {
    /// Short description of the export's shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            ExportValue::Module(_) => "a module object",
            ExportValue::Data(serde_json::Value::Null) => "null",
            ExportValue::Data(serde_json::Value::Bool(_)) => "a boolean",
            ExportValue::Data(serde_json::Value::Number(_)) => "a number",
            ExportValue::Data(serde_json::Value::String(_)) => "a string",
            ExportValue::Data(serde_json::Value::Array(_)) => "an array",
            ExportValue::Data(serde_json::Value::Object(_)) => "a plain data object",
        }
    }
}

impl std::fmt::Debug for ExportValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.shape())
    }
}

/// Everything an entry point exported.
#[derive(Debug, Default)]
pub struct ModuleExports {
    pub default: Option<ExportValue>,
}

impl ModuleExports {
    /// Exports with a module object as the default export.
    pub fn module(module: Arc<dyn PluginModule>) -> Self {
        Self {
            default: Some(ExportValue::Module(module)),
        }
    }

    /// Exports with a data value as the default export.
    pub fn data(value: serde_json::Value) -> Self {
        Self {
            default: Some(ExportValue::Data(value)),
        }
    }

    /// Exports without a default export.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Resolves plugin entry points into their exports.
///
/// Implementations may cache loaded entry points. After [`evict`](Self::evict)
/// the next [`load`](Self::load) of the same entry point must execute it
/// afresh rather than return the cached instance.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Resolves and executes the entry point.
    async fn load(&self, entry: &EntryPoint) -> Result<ModuleExports, TetherError>;

    /// Drops any cached instance of the entry point.
    fn evict(&self, entry: &EntryPoint);
}
