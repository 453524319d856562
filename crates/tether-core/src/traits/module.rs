// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The trait every plugin module implements.

use async_trait::async_trait;

use crate::context::ExtensionContext;
use crate::error::TetherError;

/// A loaded plugin implementation.
///
/// Members are addressed by name, which lets callers reach a plugin's
/// functionality without knowing its concrete type. Callers never hold a
/// module directly; they go through the runtime's guarded accessor, which
/// checks the plugin's lifecycle state before forwarding.
#[async_trait]
pub trait PluginModule: Send + Sync + 'static {
    /// Names of all members (properties and methods) the module exposes.
    fn members(&self) -> Vec<String>;

    /// Returns true if the module exposes `member`.
    fn has_member(&self, member: &str) -> bool {
        self.members().iter().any(|m| m == member)
    }

    /// Reads a data member. `None` if the member is absent or only callable.
    fn property(&self, member: &str) -> Option<serde_json::Value>;

    /// Calls a method member with JSON arguments.
    async fn invoke(
        &self,
        member: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, TetherError>;

    /// Mount hook, run once when the plugin transitions to loaded.
    async fn on_mounted(&self, ctx: &ExtensionContext) -> Result<(), TetherError>;

    /// Unmount hook, run once when the plugin is unloaded.
    async fn on_unmounted(&self, ctx: &ExtensionContext) -> Result<(), TetherError>;
}
