// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock plugin module for lifecycle and access tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tether_core::{EntryPoint, ExtensionContext, ModuleExports, PluginModule, TetherError};

/// A plugin module with scripted members and hooks.
///
/// Properties return their configured value; methods echo
/// `{"member": .., "args": ..}`. Hook invocations are counted.
#[derive(Debug, Default)]
pub struct MockModule {
    name: String,
    properties: BTreeMap<String, Value>,
    methods: Vec<String>,
    mount_error: Option<String>,
    unmount_error: Option<String>,
    mount_delay: Option<Duration>,
    mounts: AtomicUsize,
    unmounts: AtomicUsize,
    saw_registration: AtomicBool,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockModule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, member: &str, value: Value) -> Self {
        self.properties.insert(member.to_string(), value);
        self
    }

    pub fn with_method(mut self, member: &str) -> Self {
        self.methods.push(member.to_string());
        self
    }

    /// Makes the mount hook fail with `message`.
    pub fn failing_mount(mut self, message: &str) -> Self {
        self.mount_error = Some(message.to_string());
        self
    }

    /// Makes the unmount hook fail with `message`.
    pub fn failing_unmount(mut self, message: &str) -> Self {
        self.unmount_error = Some(message.to_string());
        self
    }

    /// Makes the mount hook sleep before completing.
    pub fn with_mount_delay(mut self, delay: Duration) -> Self {
        self.mount_delay = Some(delay);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mount_count(&self) -> usize {
        self.mounts.load(Ordering::SeqCst)
    }

    pub fn unmount_count(&self) -> usize {
        self.unmounts.load(Ordering::SeqCst)
    }

    /// Whether the module found itself registered with the context when
    /// its mount hook ran.
    pub fn saw_registration(&self) -> bool {
        self.saw_registration.load(Ordering::SeqCst)
    }

    /// Method calls received so far, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// A module factory building a fresh instance from `build` on every call,
    /// plus a probe over the instances it built.
    pub fn factory<F>(
        build: F,
    ) -> (
        impl Fn(&EntryPoint) -> Result<ModuleExports, TetherError> + Send + Sync + 'static,
        ModuleProbe,
    )
    where
        F: Fn() -> MockModule + Send + Sync + 'static,
    {
        let probe = ModuleProbe::default();
        let seen = probe.clone();
        let factory = move |_entry: &EntryPoint| -> Result<ModuleExports, TetherError> {
            let module = Arc::new(build());
            seen.record(module.clone());
            Ok(ModuleExports::module(module))
        };
        (factory, probe)
    }
}

#[async_trait]
impl PluginModule for MockModule {
    fn members(&self) -> Vec<String> {
        let mut members: Vec<String> = self
            .properties
            .keys()
            .cloned()
            .chain(self.methods.iter().cloned())
            .collect();
        members.sort();
        members.dedup();
        members
    }

    fn property(&self, member: &str) -> Option<Value> {
        self.properties.get(member).cloned()
    }

    async fn invoke(&self, member: &str, args: Value) -> Result<Value, TetherError> {
        if !self.methods.iter().any(|m| m == member) {
            return Err(TetherError::module(format!(
                "`{member}` is not callable on {}",
                self.name
            )));
        }
        self.calls
            .lock()
            .expect("calls lock")
            .push((member.to_string(), args.clone()));
        Ok(json!({ "member": member, "args": args }))
    }

    async fn on_mounted(&self, ctx: &ExtensionContext) -> Result<(), TetherError> {
        self.mounts.fetch_add(1, Ordering::SeqCst);
        let registered = ctx.registered().await.iter().any(|p| p.name == self.name);
        self.saw_registration.store(registered, Ordering::SeqCst);
        if let Some(delay) = self.mount_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.mount_error {
            Some(message) => Err(TetherError::module(message.clone())),
            None => Ok(()),
        }
    }

    async fn on_unmounted(&self, _ctx: &ExtensionContext) -> Result<(), TetherError> {
        self.unmounts.fetch_add(1, Ordering::SeqCst);
        match &self.unmount_error {
            Some(message) => Err(TetherError::module(message.clone())),
            None => Ok(()),
        }
    }
}

/// Collects every module instance a mock factory or loader created.
#[derive(Debug, Clone, Default)]
pub struct ModuleProbe {
    instances: Arc<Mutex<Vec<Arc<MockModule>>>>,
}

impl ModuleProbe {
    pub(crate) fn record(&self, module: Arc<MockModule>) {
        self.instances.lock().expect("probe lock").push(module);
    }

    /// Number of instances created.
    pub fn count(&self) -> usize {
        self.instances.lock().expect("probe lock").len()
    }

    /// The most recently created instance.
    pub fn latest(&self) -> Option<Arc<MockModule>> {
        self.instances.lock().expect("probe lock").last().cloned()
    }

    pub fn instances(&self) -> Vec<Arc<MockModule>> {
        self.instances.lock().expect("probe lock").clone()
    }
}
