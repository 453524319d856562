// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the plugin runtime and the host.
//!
//! Plugin code implements [`PluginModule`]; the host implements
//! [`ModuleLoader`] to turn entry points into modules and [`Notifier`] to
//! surface messages to the user.

pub mod loader;
pub mod module;
pub mod notifier;

pub use loader::{EntryPoint, ExportValue, ModuleExports, ModuleLoader};
pub use module::PluginModule;
pub use notifier::{LogNotifier, Notifier};
