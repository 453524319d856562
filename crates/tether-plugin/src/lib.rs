// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin runtime for Tether.
//!
//! Discovers plugins from `manifest.json` directories, indexes them by id and
//! capability type, drives their `ready -> loaded -> unloaded` lifecycle, and
//! resolves capability requests to a single guarded module.

pub mod discovery;
pub mod lifecycle;
pub mod loader;
pub mod manifest;
pub mod matcher;
pub mod proxy;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod runtime;

pub use discovery::{DiscoveryReport, SkippedPlugin, discover_dir, discover_plugin};
pub use lifecycle::{DEFAULT_HOOK_TIMEOUT, LifecycleController};
pub use loader::{FactoryLoader, ModuleFactory};
pub use manifest::{MANIFEST_FILE, PluginManifest, REQUIRED_FIELDS, load_manifest, parse_manifest};
pub use matcher::UrlPatterns;
pub use proxy::{GuardedModule, META_MEMBERS, is_meta_member};
pub use record::PluginRecord;
pub use registry::PluginRegistry;
pub use resolver::{CapabilityResolver, Selection, Selector, by_id, by_name, supporting};
pub use runtime::{PluginRuntime, RuntimeOptions};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::manifest::PluginManifest;
    use crate::record::PluginRecord;

    /// A valid manifest whose entry point is `<name>.js`.
    pub fn manifest(name: &str, capability: Option<&str>) -> PluginManifest {
        PluginManifest {
            name: name.to_string(),
            main: format!("{name}.js"),
            version: "0.1.0".to_string(),
            description: format!("Test plugin {name}"),
            author: "tests".to_string(),
            capability_type: capability.map(str::to_string),
            match_patterns: vec![],
            instruct: vec![],
        }
    }

    pub fn record(name: &str, capability: Option<&str>) -> Arc<PluginRecord> {
        Arc::new(PluginRecord::new(
            manifest(name, capability),
            format!("/plugins/{name}"),
        ))
    }
}
