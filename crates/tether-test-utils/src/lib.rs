// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tether integration tests.
//!
//! Provides mock plugin modules, loaders, and bridge endpoints plus on-disk
//! plugin fixtures for fast, deterministic tests.
//!
//! # Components
//!
//! - [`MockModule`] - Plugin module with configurable members and hook failures
//! - [`MockLoader`] - Module loader with scripted exports and eviction counting
//! - [`RecordingTransport`] / [`RecordingHostLink`] - Bridge endpoints that record traffic
//! - [`RecordingNotifier`] - Notifier capturing user-visible messages
//! - [`PluginFixture`] - Temporary plugins directory builder

pub mod fixture;
pub mod mock_bridge;
pub mod mock_loader;
pub mod mock_module;
pub mod mock_notifier;

pub use fixture::PluginFixture;
pub use mock_bridge::{RecordingHostLink, RecordingTransport};
pub use mock_loader::MockLoader;
pub use mock_module::{MockModule, ModuleProbe};
pub use mock_notifier::RecordingNotifier;
