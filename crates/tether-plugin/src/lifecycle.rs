// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle transitions of plugin records: `ready -> loaded -> unloaded`.
//!
//! Every transition runs while holding the record's slot lock, so status,
//! module, and proxy change together and concurrent requests for the same
//! record are serialized.

use std::sync::Arc;
use std::time::Duration;

use tether_core::{
    ExportValue, ExtensionContext, ModuleLoader, PluginId, PluginLoadError, PluginModule,
    PluginStatus,
};
use tracing::{debug, info, warn};

use crate::proxy::GuardedModule;
use crate::record::{ModuleSlot, PluginRecord};
use crate::registry::PluginRegistry;

/// Default bound on mount and unmount hooks.
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// Drives plugin records through their lifecycle.
pub struct LifecycleController {
    registry: Arc<PluginRegistry>,
    context: Arc<ExtensionContext>,
    loader: Arc<dyn ModuleLoader>,
    hook_timeout: Duration,
}

impl LifecycleController {
    pub fn new(
        registry: Arc<PluginRegistry>,
        context: Arc<ExtensionContext>,
        loader: Arc<dyn ModuleLoader>,
        hook_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            context,
            loader,
            hook_timeout,
        }
    }

    pub fn hook_timeout(&self) -> Duration {
        self.hook_timeout
    }

    /// Loads a `ready` record and returns its guarded accessor.
    ///
    /// On failure after the entry point ran, the context registration is
    /// removed and the entry point evicted; the record stays `ready`.
    pub async fn load(&self, record: &PluginRecord) -> Result<GuardedModule, PluginLoadError> {
        let mut slot = record.slot.lock().await;
        self.load_locked(record, &mut slot).await
    }

    /// Returns the accessor of a loaded record, loading it first if `ready`.
    ///
    /// Concurrent callers for the same record share a single load.
    pub async fn ensure_loaded(
        &self,
        record: &PluginRecord,
    ) -> Result<GuardedModule, PluginLoadError> {
        let mut slot = record.slot.lock().await;
        if let Some(proxy) = &slot.proxy {
            return Ok(proxy.clone());
        }
        self.load_locked(record, &mut slot).await
    }

    async fn load_locked(
        &self,
        record: &PluginRecord,
        slot: &mut ModuleSlot,
    ) -> Result<GuardedModule, PluginLoadError> {
        let status = record.status();
        if status != PluginStatus::Ready {
            return Err(PluginLoadError::NotReady {
                plugin: record.name().to_string(),
                status,
            });
        }

        let entry = record.entry_point();
        let exports = match self.loader.load(&entry).await {
            Ok(exports) => exports,
            Err(e) => {
                self.loader.evict(&entry);
                return Err(PluginLoadError::EntryPoint {
                    plugin: record.name().to_string(),
                    path: entry.path,
                    source: Box::new(e),
                });
            }
        };

        let module = match exports.default {
            Some(ExportValue::Module(module)) => module,
            None => {
                self.loader.evict(&entry);
                return Err(PluginLoadError::NoDefaultExport {
                    plugin: record.name().to_string(),
                    path: entry.path,
                });
            }
            Some(other) => {
                self.loader.evict(&entry);
                return Err(PluginLoadError::InvalidExportShape {
                    plugin: record.name().to_string(),
                    path: entry.path,
                    found: other.shape().to_string(),
                });
            }
        };

        let proxy = GuardedModule::new(record.name(), module.clone(), record.subscribe());
        self.context.register(record.descriptor()).await;

        if let Err(e) = self.mount(record, module.as_ref()).await {
            warn!(plugin = %record.name(), error = %e, "mount failed, rolling back");
            self.context.remove(&record.id()).await;
            self.loader.evict(&entry);
            return Err(e);
        }

        slot.module = Some(module);
        slot.proxy = Some(proxy.clone());
        record.set_status(PluginStatus::Loaded);
        info!(plugin = %record.name(), id = %record.id(), "plugin loaded");
        Ok(proxy)
    }

    async fn mount(
        &self,
        record: &PluginRecord,
        module: &dyn PluginModule,
    ) -> Result<(), PluginLoadError> {
        match tokio::time::timeout(self.hook_timeout, module.on_mounted(&self.context)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PluginLoadError::MountFailed {
                plugin: record.name().to_string(),
                source: Box::new(e),
            }),
            Err(_elapsed) => Err(PluginLoadError::Timeout {
                plugin: record.name().to_string(),
                hook: "mount",
                duration: self.hook_timeout,
            }),
        }
    }

    /// Unloads a loaded record. Returns false (and does nothing) if the
    /// record holds no module.
    ///
    /// Unmount hook failures are logged; the record is unloaded regardless.
    pub async fn unload(&self, record: &PluginRecord) -> bool {
        let mut slot = record.slot.lock().await;
        let Some(module) = slot.module.take() else {
            debug!(plugin = %record.name(), status = %record.status(), "unload skipped, not loaded");
            return false;
        };

        match tokio::time::timeout(self.hook_timeout, module.on_unmounted(&self.context)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(plugin = %record.name(), error = %e, "unmount hook failed");
            }
            Err(_elapsed) => {
                warn!(
                    plugin = %record.name(),
                    timeout_secs = self.hook_timeout.as_secs(),
                    "unmount hook timed out"
                );
            }
        }

        record.set_status(PluginStatus::Unloaded);
        self.context.remove(&record.id()).await;
        self.registry.remove(record).await;
        slot.proxy = None;
        self.loader.evict(&record.entry_point());

        info!(plugin = %record.name(), id = %record.id(), "plugin unloaded");
        true
    }

    /// Unloads the record with the given id, if registered and loaded.
    pub async fn unload_by_id(&self, id: &PluginId) -> bool {
        match self.registry.get_by_id(id).await {
            Some(record) => self.unload(&record).await,
            None => false,
        }
    }
}

impl std::fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("hook_timeout", &self.hook_timeout)
            .finish_non_exhaustive()
    }
}
