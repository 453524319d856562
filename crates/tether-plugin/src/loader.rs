// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Module loader for plugin modules compiled into the host binary.
//!
//! Plugins ship their `manifest.json` on disk like any other plugin, and the
//! host registers a [`ModuleFactory`] under the plugin's name and manifest
//! `main` value. Many plugins share a `main` such as `dist/index.js`, so the
//! name is part of the key. The loader caches the exports per entry-point path
//! until they are evicted.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tether_core::{EntryPoint, ExportValue, ModuleExports, ModuleLoader, TetherError};
use tracing::debug;

/// Creates the exports of one entry point.
pub trait ModuleFactory: Send + Sync {
    fn create(&self, entry: &EntryPoint) -> Result<ModuleExports, TetherError>;
}

impl<F> ModuleFactory for F
where
    F: Fn(&EntryPoint) -> Result<ModuleExports, TetherError> + Send + Sync,
{
    fn create(&self, entry: &EntryPoint) -> Result<ModuleExports, TetherError> {
        self(entry)
    }
}

/// [`ModuleLoader`] backed by registered factories.
#[derive(Default)]
pub struct FactoryLoader {
    factories: HashMap<FactoryKey, Arc<dyn ModuleFactory>>,
    cache: Mutex<HashMap<PathBuf, Option<CachedExport>>>,
}

/// Plugin name and manifest `main`.
type FactoryKey = (String, String);

#[derive(Clone)]
enum CachedExport {
    Module(Arc<dyn tether_core::PluginModule>),
    Data(serde_json::Value),
}

impl CachedExport {
    fn from_exports(exports: &ModuleExports) -> Option<Self> {
        match &exports.default {
            Some(ExportValue::Module(module)) => Some(Self::Module(module.clone())),
            Some(ExportValue::Data(value)) => Some(Self::Data(value.clone())),
            None => None,
        }
    }

    fn to_exports(cached: &Option<Self>) -> ModuleExports {
        match cached {
            Some(Self::Module(module)) => ModuleExports::module(module.clone()),
            Some(Self::Data(value)) => ModuleExports::data(value.clone()),
            None => ModuleExports::empty(),
        }
    }
}

impl FactoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` for the entry point `main` of the plugin named
    /// `plugin`. A second registration for the same pair replaces the first.
    pub fn register(
        &mut self,
        plugin: impl Into<String>,
        main: impl Into<String>,
        factory: impl ModuleFactory + 'static,
    ) {
        self.factories
            .insert((plugin.into(), main.into()), Arc::new(factory));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_factory(
        mut self,
        plugin: impl Into<String>,
        main: impl Into<String>,
        factory: impl ModuleFactory + 'static,
    ) -> Self {
        self.register(plugin, main, factory);
        self
    }

    /// Returns true if a factory is registered for `main` of `plugin`.
    pub fn handles(&self, plugin: &str, main: &str) -> bool {
        self.factories
            .contains_key(&(plugin.to_owned(), main.to_owned()))
    }

    /// Number of entry points currently cached.
    pub fn cached(&self) -> usize {
        self.cache().len()
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<PathBuf, Option<CachedExport>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ModuleLoader for FactoryLoader {
    async fn load(&self, entry: &EntryPoint) -> Result<ModuleExports, TetherError> {
        if let Some(cached) = self.cache().get(&entry.path) {
            return Ok(CachedExport::to_exports(cached));
        }

        let key = (entry.plugin.clone(), entry.main.clone());
        let factory = self.factories.get(&key).ok_or_else(|| {
            TetherError::module(format!(
                "no module factory registered for `{}` (plugin `{}`)",
                entry.main, entry.plugin
            ))
        })?;
        let exports = factory.create(entry)?;
        debug!(plugin = %entry.plugin, path = %entry.path.display(), "entry point executed");

        self.cache()
            .insert(entry.path.clone(), CachedExport::from_exports(&exports));
        Ok(exports)
    }

    fn evict(&self, entry: &EntryPoint) {
        if self.cache().remove(&entry.path).is_some() {
            debug!(plugin = %entry.plugin, path = %entry.path.display(), "entry point evicted");
        }
    }
}

impl std::fmt::Debug for FactoryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self
            .factories
            .keys()
            .map(|(plugin, main)| format!("{plugin}:{main}"))
            .collect();
        keys.sort();
        f.debug_struct("FactoryLoader")
            .field("factories", &keys)
            .field("cached", &self.cached())
            .finish()
    }
}
