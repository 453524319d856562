// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin records: one per discovered plugin directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tether_core::{
    CapabilityType, EntryPoint, PluginDescriptor, PluginId, PluginModule, PluginStatus,
};
use tokio::sync::{Mutex, watch};

use crate::manifest::PluginManifest;
use crate::matcher::UrlPatterns;
use crate::proxy::GuardedModule;

/// The module and its guarded accessor. Both are set while the record is
/// loaded and both are empty otherwise.
#[derive(Default)]
pub(crate) struct ModuleSlot {
    pub(crate) module: Option<Arc<dyn PluginModule>>,
    pub(crate) proxy: Option<GuardedModule>,
}

/// A discovered plugin and its lifecycle state.
///
/// Status is published through a watch channel so access proxies observe
/// transitions without taking the slot lock. Transitions themselves hold the
/// slot lock for their whole duration.
pub struct PluginRecord {
    id: PluginId,
    manifest: PluginManifest,
    directory: PathBuf,
    entry_path: PathBuf,
    capability_type: CapabilityType,
    patterns: UrlPatterns,
    status: watch::Sender<PluginStatus>,
    pub(crate) slot: Mutex<ModuleSlot>,
}

impl PluginRecord {
    /// Creates a `ready` record for a plugin living in `directory`.
    pub fn new(manifest: PluginManifest, directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        let entry_path = directory.join(&manifest.main);
        let capability_type = manifest.capability_type();
        let patterns = UrlPatterns::compile(&manifest.name, manifest.match_patterns.as_slice());
        let (status, _) = watch::channel(PluginStatus::Ready);
        Self {
            id: PluginId::new(),
            manifest,
            directory,
            entry_path,
            capability_type,
            patterns,
            status,
            slot: Mutex::new(ModuleSlot::default()),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_id(mut self, id: PluginId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> PluginId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn entry_path(&self) -> &Path {
        &self.entry_path
    }

    pub fn capability_type(&self) -> &CapabilityType {
        &self.capability_type
    }

    /// Returns true if one of the manifest's `match` patterns covers `url`.
    pub fn matches_url(&self, url: &str) -> bool {
        self.patterns.matches(url)
    }

    /// Returns true if the manifest lists `instruct` among its instruction kinds.
    pub fn supports(&self, instruct: &str) -> bool {
        self.manifest.instruct.iter().any(|i| i == instruct)
    }

    /// Current lifecycle status.
    pub fn status(&self) -> PluginStatus {
        *self.status.borrow()
    }

    /// A live view of the status, updated on every transition.
    pub fn subscribe(&self) -> watch::Receiver<PluginStatus> {
        self.status.subscribe()
    }

    pub(crate) fn set_status(&self, status: PluginStatus) {
        self.status.send_replace(status);
    }

    /// The entry point handed to the module loader.
    pub fn entry_point(&self) -> EntryPoint {
        EntryPoint {
            plugin: self.manifest.name.clone(),
            main: self.manifest.main.clone(),
            path: self.entry_path.clone(),
        }
    }

    pub fn descriptor(&self) -> PluginDescriptor {
        PluginDescriptor {
            id: self.id,
            name: self.manifest.name.clone(),
            version: self.manifest.version.clone(),
            capability_type: self.capability_type.clone(),
        }
    }

    /// The loaded module, if any. Waits for an in-flight transition.
    pub async fn module(&self) -> Option<Arc<dyn PluginModule>> {
        self.slot.lock().await.module.clone()
    }

    /// The guarded accessor, if loaded. Waits for an in-flight transition.
    pub async fn access_proxy(&self) -> Option<GuardedModule> {
        self.slot.lock().await.proxy.clone()
    }
}

impl std::fmt::Debug for PluginRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRecord")
            .field("id", &self.id)
            .field("name", &self.manifest.name)
            .field("capability_type", &self.capability_type)
            .field("status", &self.status())
            .field("directory", &self.directory)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> PluginManifest {
        PluginManifest {
            name: "shell".into(),
            main: "bin/shell.js".into(),
            version: "0.3.0".into(),
            description: "Runs shell snippets".into(),
            author: "tether".into(),
            capability_type: Some("executor".into()),
            match_patterns: vec!["https://*.internal/*".into()],
            instruct: vec!["bash".into(), "sh".into()],
        }
    }

    #[tokio::test]
    async fn new_record_is_ready_and_empty() {
        let record = PluginRecord::new(manifest(), "/plugins/shell");
        assert_eq!(record.status(), PluginStatus::Ready);
        assert!(record.module().await.is_none());
        assert!(record.access_proxy().await.is_none());
        assert_eq!(record.entry_path(), Path::new("/plugins/shell/bin/shell.js"));
        assert_eq!(record.capability_type().as_str(), "executor");
    }

    #[test]
    fn ids_differ_between_records() {
        let a = PluginRecord::new(manifest(), "/plugins/shell");
        let b = PluginRecord::new(manifest(), "/plugins/shell");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn status_changes_reach_subscribers() {
        let record = PluginRecord::new(manifest(), "/plugins/shell");
        let view = record.subscribe();
        record.set_status(PluginStatus::Loaded);
        assert_eq!(*view.borrow(), PluginStatus::Loaded);
        assert_eq!(record.status(), PluginStatus::Loaded);
    }

    #[test]
    fn status_updates_without_subscribers() {
        let record = PluginRecord::new(manifest(), "/plugins/shell");
        record.set_status(PluginStatus::Unloaded);
        assert_eq!(record.status(), PluginStatus::Unloaded);
    }

    #[test]
    fn descriptor_and_entry_point() {
        let record = PluginRecord::new(manifest(), "/plugins/shell");
        let descriptor = record.descriptor();
        assert_eq!(descriptor.id, record.id());
        assert_eq!(descriptor.version, "0.3.0");
        let entry = record.entry_point();
        assert_eq!(entry.plugin, "shell");
        assert_eq!(entry.main, "bin/shell.js");
    }

    #[test]
    fn instruct_and_url_queries() {
        let record = PluginRecord::new(manifest(), "/plugins/shell");
        assert!(record.supports("bash"));
        assert!(!record.supports("python"));
        assert!(record.matches_url("https://ci.internal/jobs"));
        assert!(!record.matches_url("https://example.com/"));
    }
}
