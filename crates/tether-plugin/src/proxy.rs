// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guarded access to a loaded plugin module.

use std::sync::Arc;

use serde_json::Value;
use tether_core::{AccessError, PluginModule, PluginStatus};
use tokio::sync::watch;

/// Members forwarded to the module without a lifecycle check.
///
/// Runtimes and serializers probe these on any object, loaded or not.
pub const META_MEMBERS: [&str; 5] = ["toString", "valueOf", "then", "toJSON", "onMounted"];

/// Returns true if `member` bypasses the status check.
pub fn is_meta_member(member: &str) -> bool {
    META_MEMBERS.contains(&member)
}

/// Accessor handed to callers in place of the raw module.
///
/// Every access re-reads the owning record's status, so a `GuardedModule`
/// kept across an unload starts failing with [`AccessError::InvalidState`]
/// instead of reaching a torn-down module.
#[derive(Clone)]
pub struct GuardedModule {
    plugin: Arc<str>,
    module: Arc<dyn PluginModule>,
    status: watch::Receiver<PluginStatus>,
}

impl GuardedModule {
    pub(crate) fn new(
        plugin: &str,
        module: Arc<dyn PluginModule>,
        status: watch::Receiver<PluginStatus>,
    ) -> Self {
        Self {
            plugin: Arc::from(plugin),
            module,
            status,
        }
    }

    /// Name of the plugin this accessor belongs to.
    pub fn plugin_name(&self) -> &str {
        &self.plugin
    }

    /// Current status of the owning record.
    pub fn status(&self) -> PluginStatus {
        *self.status.borrow()
    }

    /// Reads a member.
    ///
    /// `Ok(None)` means the member exists but holds no data (it is a method).
    pub fn get_property(&self, member: &str) -> Result<Option<Value>, AccessError> {
        if !is_meta_member(member) {
            self.guard(member)?;
        }
        Ok(self.module.property(member))
    }

    /// Calls a method member with JSON arguments.
    pub async fn invoke(&self, member: &str, args: Value) -> Result<Value, AccessError> {
        if !is_meta_member(member) {
            self.guard(member)?;
        }
        self.module
            .invoke(member, args)
            .await
            .map_err(|e| AccessError::Invocation {
                plugin: self.plugin.to_string(),
                member: member.to_string(),
                source: Box::new(e),
            })
    }

    fn guard(&self, member: &str) -> Result<(), AccessError> {
        let status = self.status();
        if status != PluginStatus::Loaded {
            return Err(AccessError::InvalidState {
                plugin: self.plugin.to_string(),
                status,
            });
        }
        if !self.module.has_member(member) {
            return Err(AccessError::NoSuchMember {
                plugin: self.plugin.to_string(),
                member: member.to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for GuardedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedModule")
            .field("plugin", &self.plugin)
            .field("status", &self.status())
            .finish()
    }
}
