// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared extension context handed to plugin hooks.
//!
//! The context is created once by the host at startup and passed by `Arc`
//! to the lifecycle controller. Loaded plugins are registered with it so
//! that hooks can discover their peers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::traits::notifier::{LogNotifier, Notifier};
use crate::types::{PluginDescriptor, PluginId};

/// Process-wide context shared by all loaded plugins.
pub struct ExtensionContext {
    plugins: RwLock<HashMap<PluginId, PluginDescriptor>>,
    notifier: Arc<dyn Notifier>,
}

impl ExtensionContext {
    /// Creates an empty context that reports through `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            plugins: RwLock::new(HashMap::new()),
            notifier,
        }
    }

    /// Registers a plugin that is being loaded. Re-registering replaces the entry.
    pub async fn register(&self, plugin: PluginDescriptor) {
        tracing::debug!(plugin = %plugin.name, id = %plugin.id, "plugin registered with extension context");
        self.plugins.write().await.insert(plugin.id, plugin);
    }

    /// Removes a plugin. Removing an unknown plugin is a no-op.
    pub async fn remove(&self, id: &PluginId) -> Option<PluginDescriptor> {
        self.plugins.write().await.remove(id)
    }

    /// Returns true if the plugin is currently registered.
    pub async fn is_registered(&self, id: &PluginId) -> bool {
        self.plugins.read().await.contains_key(id)
    }

    /// Lists registered plugins, sorted by name.
    pub async fn registered(&self) -> Vec<PluginDescriptor> {
        let mut plugins: Vec<PluginDescriptor> =
            self.plugins.read().await.values().cloned().collect();
        plugins.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        plugins
    }

    /// The user-facing notification sink.
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }
}

impl Default for ExtensionContext {
    fn default() -> Self {
        Self::new(Arc::new(LogNotifier))
    }
}

impl std::fmt::Debug for ExtensionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionContext").finish_non_exhaustive()
    }
}
