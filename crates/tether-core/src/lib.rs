// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tether plugin runtime.
//!
//! This crate provides the error taxonomy, shared identifiers, the trait
//! seams plugins and hosts implement, and the shared extension context.

pub mod context;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use context::ExtensionContext;
pub use error::{
    AccessError, BoxError, BridgeError, DiscoveryError, ManifestError, PluginLoadError,
    ResolutionError, TetherError,
};
pub use types::{CapabilityType, ContextId, PluginDescriptor, PluginId, PluginStatus};

pub use traits::{
    EntryPoint, ExportValue, LogNotifier, ModuleExports, ModuleLoader, Notifier, PluginModule,
};
