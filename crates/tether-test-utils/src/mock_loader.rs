// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock module loader with scripted exports per entry point.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tether_core::{EntryPoint, ModuleExports, ModuleLoader, TetherError};

use crate::mock_module::{MockModule, ModuleProbe};

type Build = Arc<dyn Fn() -> MockModule + Send + Sync>;

enum Script {
    Module(Build),
    Data(Value),
    NoDefault,
    Fail(String),
}

/// A [`ModuleLoader`] whose exports are scripted per manifest `main`.
///
/// Module exports are cached per entry-point path until evicted, so a load
/// after [`evict`](ModuleLoader::evict) builds a fresh instance.
#[derive(Default)]
pub struct MockLoader {
    scripts: HashMap<String, Script>,
    cache: Mutex<HashMap<PathBuf, Arc<MockModule>>>,
    probe: ModuleProbe,
    executions: AtomicUsize,
    evictions: AtomicUsize,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry point `main` exports a module built by `build`.
    pub fn with_module<F>(mut self, main: &str, build: F) -> Self
    where
        F: Fn() -> MockModule + Send + Sync + 'static,
    {
        self.scripts
            .insert(main.to_string(), Script::Module(Arc::new(build)));
        self
    }

    /// Entry point `main` exports plain data.
    pub fn with_data(mut self, main: &str, value: Value) -> Self {
        self.scripts.insert(main.to_string(), Script::Data(value));
        self
    }

    /// Entry point `main` has no default export.
    pub fn with_no_default(mut self, main: &str) -> Self {
        self.scripts.insert(main.to_string(), Script::NoDefault);
        self
    }

    /// Entry point `main` fails to execute.
    pub fn with_failure(mut self, main: &str, message: &str) -> Self {
        self.scripts
            .insert(main.to_string(), Script::Fail(message.to_string()));
        self
    }

    /// Probe over every module instance built so far.
    pub fn probe(&self) -> ModuleProbe {
        self.probe.clone()
    }

    /// Number of times an entry point was executed (cache misses).
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    /// Number of evict calls.
    pub fn evictions(&self) -> usize {
        self.evictions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModuleLoader for MockLoader {
    async fn load(&self, entry: &EntryPoint) -> Result<ModuleExports, TetherError> {
        if let Some(module) = self.cache.lock().expect("cache lock").get(&entry.path) {
            return Ok(ModuleExports::module(module.clone()));
        }

        let script = self.scripts.get(&entry.main).ok_or_else(|| {
            TetherError::module(format!("cannot find module {}", entry.path.display()))
        })?;
        self.executions.fetch_add(1, Ordering::SeqCst);

        match script {
            Script::Module(build) => {
                let module = Arc::new(build());
                self.probe.record(module.clone());
                self.cache
                    .lock()
                    .expect("cache lock")
                    .insert(entry.path.clone(), module.clone());
                Ok(ModuleExports::module(module))
            }
            Script::Data(value) => Ok(ModuleExports::data(value.clone())),
            Script::NoDefault => Ok(ModuleExports::empty()),
            Script::Fail(message) => Err(TetherError::module(format!(
                "{message} ({})",
                entry.path.display()
            ))),
        }
    }

    fn evict(&self, entry: &EntryPoint) {
        self.evictions.fetch_add(1, Ordering::SeqCst);
        self.cache.lock().expect("cache lock").remove(&entry.path);
    }
}
