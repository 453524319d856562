// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide plugin runtime.
//!
//! `PluginRuntime` owns the registry, the extension context, the lifecycle
//! controller and the resolver. The host creates one at startup, shares it
//! by `Arc`, and calls [`PluginRuntime::shutdown`] before exiting.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tether_config::model::PluginsConfig;
use tether_core::{
    CapabilityType, DiscoveryError, ExtensionContext, ModuleLoader, Notifier, PluginId,
    ResolutionError,
};
use tracing::{info, warn};

use crate::discovery::{self, DiscoveryReport};
use crate::lifecycle::{DEFAULT_HOOK_TIMEOUT, LifecycleController};
use crate::proxy::GuardedModule;
use crate::record::PluginRecord;
use crate::registry::PluginRegistry;
use crate::resolver::{CapabilityResolver, Selector};

/// Runtime behaviour knobs, usually taken from the `[plugins]` config section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Bound on each mount and unmount hook.
    pub hook_timeout: Duration,
    /// Whether single-plugin discovery treats a missing manifest as an error.
    pub strict: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            hook_timeout: DEFAULT_HOOK_TIMEOUT,
            strict: false,
        }
    }
}

impl From<&PluginsConfig> for RuntimeOptions {
    fn from(config: &PluginsConfig) -> Self {
        Self {
            hook_timeout: config.hook_timeout(),
            strict: config.strict,
        }
    }
}

/// The plugin runtime.
pub struct PluginRuntime {
    registry: Arc<PluginRegistry>,
    context: Arc<ExtensionContext>,
    controller: Arc<LifecycleController>,
    resolver: CapabilityResolver,
    options: RuntimeOptions,
}

impl PluginRuntime {
    pub fn new(
        loader: Arc<dyn ModuleLoader>,
        notifier: Arc<dyn Notifier>,
        options: RuntimeOptions,
    ) -> Self {
        let registry = Arc::new(PluginRegistry::new());
        let context = Arc::new(ExtensionContext::new(notifier));
        let controller = Arc::new(LifecycleController::new(
            registry.clone(),
            context.clone(),
            loader,
            options.hook_timeout,
        ));
        let resolver = CapabilityResolver::new(registry.clone(), controller.clone());
        Self {
            registry,
            context,
            controller,
            resolver,
            options,
        }
    }

    /// Creates a runtime configured from the `[plugins]` section.
    pub fn from_config(
        config: &PluginsConfig,
        loader: Arc<dyn ModuleLoader>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(loader, notifier, RuntimeOptions::from(config))
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn context(&self) -> &Arc<ExtensionContext> {
        &self.context
    }

    pub fn controller(&self) -> &Arc<LifecycleController> {
        &self.controller
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Discovers a single plugin directory using the configured strictness.
    pub async fn add_plugin(
        &self,
        dir: &Path,
    ) -> Result<Option<Arc<PluginRecord>>, DiscoveryError> {
        discovery::discover_plugin(&self.registry, dir, self.options.strict).await
    }

    /// Discovers every plugin under `root`.
    pub async fn discover(&self, root: &Path) -> Result<DiscoveryReport, DiscoveryError> {
        discovery::discover_dir(&self.registry, root).await
    }

    /// Discovers every plugin under each root. Roots that cannot be scanned
    /// are logged and skipped.
    pub async fn discover_all(&self, roots: &[PathBuf]) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();
        for root in roots {
            match self.discover(root).await {
                Ok(found) => report.merge(found),
                Err(e) => warn!(root = %root.display(), error = %e, "cannot scan plugin root"),
            }
        }
        report
    }

    /// Resolves a capability to one loaded provider.
    pub async fn resolve(
        &self,
        capability: &CapabilityType,
        selector: Option<&dyn Selector>,
    ) -> Result<GuardedModule, ResolutionError> {
        self.resolver.resolve(capability, selector).await
    }

    /// Like [`resolve`](Self::resolve), but also reports a failure to the
    /// user through the context's notifier.
    pub async fn resolve_or_notify(
        &self,
        capability: &CapabilityType,
        selector: Option<&dyn Selector>,
    ) -> Result<GuardedModule, ResolutionError> {
        let result = self.resolve(capability, selector).await;
        if let Err(e) = &result {
            self.context.notifier().notify_error(&e.to_string());
        }
        result
    }

    /// Unloads the plugin with the given id.
    pub async fn unload(&self, id: &PluginId) -> bool {
        self.controller.unload_by_id(id).await
    }

    /// Unloads every loaded plugin. Returns how many were unloaded.
    pub async fn shutdown(&self) -> usize {
        let mut unloaded = 0;
        for record in self.registry.loaded().await {
            if self.controller.unload(&record).await {
                unloaded += 1;
            }
        }
        info!(unloaded, "plugin runtime shut down");
        unloaded
    }
}

impl std::fmt::Debug for PluginRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRuntime")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use tether_core::PluginStatus;
    use tether_test_utils::{MockLoader, MockModule, PluginFixture, RecordingNotifier};

    use super::*;

    fn runtime(loader: MockLoader, notifier: Arc<RecordingNotifier>) -> PluginRuntime {
        PluginRuntime::new(Arc::new(loader), notifier, RuntimeOptions::default())
    }

    #[test]
    fn options_follow_config() {
        let config = PluginsConfig {
            strict: true,
            hook_timeout_secs: 7,
            ..PluginsConfig::default()
        };
        let options = RuntimeOptions::from(&config);
        assert!(options.strict);
        assert_eq!(options.hook_timeout, Duration::from_secs(7));
    }

    #[tokio::test]
    async fn discover_resolve_shutdown() {
        let fixture = PluginFixture::new();
        fixture.plugin("node", Some("executor"));
        fixture.plugin("prettier", Some("formatter"));
        let loader = MockLoader::new()
            .with_module("node.js", || MockModule::new("node"))
            .with_module("prettier.js", || MockModule::new("prettier"));
        let rt = runtime(loader, Arc::new(RecordingNotifier::default()));

        let report = rt.discover(fixture.root()).await.unwrap();
        assert_eq!(report.added.len(), 2);

        rt.resolve(&"executor".into(), None).await.unwrap();
        rt.resolve(&"formatter".into(), None).await.unwrap();
        assert_eq!(rt.registry().loaded().await.len(), 2);
        assert_eq!(rt.context().registered().await.len(), 2);

        assert_eq!(rt.shutdown().await, 2);
        assert!(rt.registry().is_empty().await);
        assert!(rt.context().registered().await.is_empty());
        for record in report.added {
            assert_eq!(record.status(), PluginStatus::Unloaded);
        }
    }

    #[tokio::test]
    async fn shutdown_leaves_ready_plugins_registered() {
        let fixture = PluginFixture::new();
        fixture.plugin("node", Some("executor"));
        let rt = runtime(MockLoader::new(), Arc::new(RecordingNotifier::default()));
        rt.discover(fixture.root()).await.unwrap();

        assert_eq!(rt.shutdown().await, 0);
        assert_eq!(rt.registry().len().await, 1);
    }

    #[tokio::test]
    async fn resolve_or_notify_reports_failures() {
        let notifier = Arc::new(RecordingNotifier::default());
        let rt = runtime(MockLoader::new(), notifier.clone());

        let err = rt
            .resolve_or_notify(&"executor".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::NoProvidersForType { .. }));
        let errors = notifier.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("executor"));
    }

    #[tokio::test]
    async fn discover_all_skips_missing_roots() {
        let fixture = PluginFixture::new();
        fixture.plugin("node", Some("executor"));
        let rt = runtime(MockLoader::new(), Arc::new(RecordingNotifier::default()));

        let roots = vec![fixture.root().join("missing"), fixture.root().to_path_buf()];
        let report = rt.discover_all(&roots).await;
        assert_eq!(report.added.len(), 1);
    }

    #[tokio::test]
    async fn add_plugin_honours_strictness() {
        let fixture = PluginFixture::new();
        let empty = fixture.empty_dir("empty");

        let lenient = runtime(MockLoader::new(), Arc::new(RecordingNotifier::default()));
        assert!(lenient.add_plugin(&empty).await.unwrap().is_none());

        let strict = PluginRuntime::new(
            Arc::new(MockLoader::new()),
            Arc::new(RecordingNotifier::default()),
            RuntimeOptions {
                strict: true,
                ..RuntimeOptions::default()
            },
        );
        assert!(matches!(
            strict.add_plugin(&empty).await,
            Err(DiscoveryError::ManifestNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn unload_by_id_through_runtime() {
        let fixture = PluginFixture::new();
        let dir = fixture.plugin("node", Some("executor"));
        let loader = MockLoader::new().with_module("node.js", || MockModule::new("node"));
        let rt = runtime(loader, Arc::new(RecordingNotifier::default()));

        let record = rt.add_plugin(&dir).await.unwrap().unwrap();
        rt.resolve(&"executor".into(), None).await.unwrap();
        assert!(rt.unload(&record.id()).await);
        assert!(!rt.unload(&record.id()).await);
    }
}
