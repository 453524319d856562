// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests across discovery, lifecycle, resolution, and the
//! channel bridge.
//!
//! Each test builds its own plugin fixture and runtime. Tests are
//! independent and order-insensitive.

use std::sync::Arc;

use serde_json::json;
use tether_bridge::{ChannelBridge, ChannelRouter, HostNotice, ListenerRegistry};
use tether_config::model::TetherConfig;
use tether_core::{AccessError, ContextId, PluginLoadError, PluginStatus, ResolutionError};
use tether_plugin::{FactoryLoader, PluginRuntime, RuntimeOptions, supporting};
use tether_test_utils::{
    MockLoader, MockModule, PluginFixture, RecordingHostLink, RecordingNotifier,
    RecordingTransport,
};

fn runtime_with(loader: MockLoader) -> (PluginRuntime, Arc<MockLoader>) {
    let loader = Arc::new(loader);
    let runtime = PluginRuntime::new(
        loader.clone(),
        Arc::new(RecordingNotifier::default()),
        RuntimeOptions::default(),
    );
    (runtime, loader)
}

// ---- Test 1: Discovery ----

#[tokio::test]
async fn test_discovery_indexes_valid_plugin_and_skips_stray_folder() {
    let fixture = PluginFixture::new();
    fixture.plugin("node", Some("executor"));
    fixture.empty_dir("screenshots");
    let (runtime, _) = runtime_with(MockLoader::new());

    let report = runtime.discover(fixture.root()).await.unwrap();
    assert_eq!(report.added.len(), 1);
    assert_eq!(report.skipped.len(), 1);

    let executors = runtime
        .registry()
        .get_by_type(&"executor".into())
        .await
        .unwrap();
    assert_eq!(executors.len(), 1);
    assert_eq!(executors[0].status(), PluginStatus::Ready);
}

// ---- Test 2: Resolution loads on demand ----

#[tokio::test]
async fn test_resolve_returns_loaded_proxy() {
    let fixture = PluginFixture::new();
    fixture.plugin("node", Some("executor"));
    let (runtime, loader) = runtime_with(MockLoader::new().with_module("node.js", || {
        MockModule::new("node")
            .with_property("language", json!("javascript"))
            .with_method("execute")
    }));
    runtime.discover(fixture.root()).await.unwrap();

    let proxy = runtime.resolve(&"executor".into(), None).await.unwrap();
    assert_eq!(proxy.status(), PluginStatus::Loaded);
    assert_eq!(
        proxy.get_property("language").unwrap(),
        Some(json!("javascript"))
    );
    let out = proxy.invoke("execute", json!({ "code": "1+1" })).await.unwrap();
    assert_eq!(out["args"]["code"], "1+1");

    let module = loader.probe().latest().unwrap();
    assert_eq!(module.mount_count(), 1);
    assert!(module.saw_registration());
}

#[tokio::test]
async fn test_resolve_with_no_providers() {
    let (runtime, _) = runtime_with(MockLoader::new());
    let err = runtime.resolve(&"executor".into(), None).await.unwrap_err();
    assert!(matches!(err, ResolutionError::NoProvidersForType { .. }));
}

// ---- Test 3: Unload semantics ----

#[tokio::test]
async fn test_double_unload_runs_hook_once() {
    let fixture = PluginFixture::new();
    let dir = fixture.plugin("node", Some("executor"));
    let (runtime, loader) =
        runtime_with(MockLoader::new().with_module("node.js", || MockModule::new("node")));
    let record = runtime.add_plugin(&dir).await.unwrap().unwrap();
    runtime.resolve(&"executor".into(), None).await.unwrap();

    assert!(runtime.controller().unload(&record).await);
    assert!(!runtime.controller().unload(&record).await);
    assert_eq!(loader.probe().latest().unwrap().unmount_count(), 1);
    assert_eq!(record.status(), PluginStatus::Unloaded);
    assert!(record.module().await.is_none());
}

#[tokio::test]
async fn test_proxy_rejects_access_after_unload() {
    let fixture = PluginFixture::new();
    let dir = fixture.plugin("node", Some("executor"));
    let (runtime, _) = runtime_with(MockLoader::new().with_module("node.js", || {
        MockModule::new("node").with_property("language", json!("javascript"))
    }));
    let record = runtime.add_plugin(&dir).await.unwrap().unwrap();
    let proxy = runtime.resolve(&"executor".into(), None).await.unwrap();

    runtime.unload(&record.id()).await;
    let err = proxy.get_property("language").unwrap_err();
    assert!(matches!(
        err,
        AccessError::InvalidState {
            status: PluginStatus::Unloaded,
            ..
        }
    ));
    // Meta members stay reachable.
    assert!(proxy.get_property("toJSON").is_ok());
}

#[tokio::test]
async fn test_rediscovered_plugin_loads_fresh_instance() {
    let fixture = PluginFixture::new();
    let dir = fixture.plugin("node", Some("executor"));
    let (factory, probe) = MockModule::factory(|| MockModule::new("node"));
    let loader = FactoryLoader::new().with_factory("node", "node.js", factory);
    let runtime = PluginRuntime::new(
        Arc::new(loader),
        Arc::new(RecordingNotifier::default()),
        RuntimeOptions::default(),
    );

    let first = runtime.add_plugin(&dir).await.unwrap().unwrap();
    runtime.resolve(&"executor".into(), None).await.unwrap();
    assert!(runtime.unload(&first.id()).await);

    let second = runtime.add_plugin(&dir).await.unwrap().unwrap();
    assert_ne!(first.id(), second.id());
    runtime.resolve(&"executor".into(), None).await.unwrap();

    assert_eq!(probe.count(), 2);
    let instances = probe.instances();
    assert!(!Arc::ptr_eq(&instances[0], &instances[1]));
}

// ---- Test 4: Mount failure rollback ----

#[tokio::test]
async fn test_mount_failure_leaves_record_ready() {
    let fixture = PluginFixture::new();
    let dir = fixture.plugin("node", Some("executor"));
    let (runtime, loader) = runtime_with(MockLoader::new().with_module("node.js", || {
        MockModule::new("node").failing_mount("interpreter missing")
    }));
    let record = runtime.add_plugin(&dir).await.unwrap().unwrap();

    let err = runtime.resolve(&"executor".into(), None).await.unwrap_err();
    assert!(matches!(
        err,
        ResolutionError::Load(PluginLoadError::MountFailed { .. })
    ));
    assert_eq!(record.status(), PluginStatus::Ready);
    assert!(record.module().await.is_none());
    assert!(!runtime.context().is_registered(&record.id()).await);
    assert_eq!(loader.evictions(), 1);
}

// ---- Test 5: Ambiguity and selectors ----

#[tokio::test]
async fn test_multiple_providers_need_a_selector() {
    let fixture = PluginFixture::new();
    fixture.plugin_with_manifest(
        "node",
        json!({
            "name": "node", "main": "node.js", "version": "1.0.0",
            "description": "JavaScript", "author": "tests",
            "type": "executor", "instruct": ["javascript"]
        }),
    );
    fixture.plugin_with_manifest(
        "python",
        json!({
            "name": "python", "main": "python.js", "version": "1.0.0",
            "description": "Python", "author": "tests",
            "type": "executor", "instruct": ["python"]
        }),
    );
    let (runtime, _) = runtime_with(
        MockLoader::new()
            .with_module("node.js", || MockModule::new("node"))
            .with_module("python.js", || MockModule::new("python")),
    );
    runtime.discover(fixture.root()).await.unwrap();

    let err = runtime.resolve(&"executor".into(), None).await.unwrap_err();
    assert!(matches!(err, ResolutionError::AmbiguousProviders { .. }));

    let proxy = runtime
        .resolve(&"executor".into(), Some(&supporting("python")))
        .await
        .unwrap();
    assert_eq!(proxy.plugin_name(), "python");
}

#[tokio::test]
async fn test_plugins_sharing_entry_point_path_resolve_to_own_modules() {
    let fixture = PluginFixture::new();
    for (name, capability) in [("node", "executor"), ("prettier", "formatter")] {
        fixture.plugin_with_manifest(
            name,
            json!({
                "name": name, "main": "dist/index.js", "version": "1.0.0",
                "description": name, "author": "tests", "type": capability
            }),
        );
    }
    let (node, _) = MockModule::factory(|| MockModule::new("node").with_method("execute"));
    let (prettier, _) =
        MockModule::factory(|| MockModule::new("prettier").with_method("format"));
    let loader = FactoryLoader::new()
        .with_factory("node", "dist/index.js", node)
        .with_factory("prettier", "dist/index.js", prettier);
    let runtime = PluginRuntime::new(
        Arc::new(loader),
        Arc::new(RecordingNotifier::default()),
        RuntimeOptions::default(),
    );
    runtime.discover(fixture.root()).await.unwrap();

    let executor = runtime.resolve(&"executor".into(), None).await.unwrap();
    assert!(executor.invoke("execute", json!({})).await.is_ok());
    let formatter = runtime.resolve(&"formatter".into(), None).await.unwrap();
    assert!(formatter.invoke("format", json!({})).await.is_ok());
    assert!(formatter.invoke("execute", json!({})).await.is_err());
}

// ---- Test 6: Shutdown ----

#[tokio::test]
async fn test_shutdown_unloads_everything() {
    let fixture = PluginFixture::new();
    fixture.plugin("node", Some("executor"));
    fixture.plugin("prettier", Some("formatter"));
    let (runtime, loader) = runtime_with(
        MockLoader::new()
            .with_module("node.js", || MockModule::new("node"))
            .with_module("prettier.js", || MockModule::new("prettier")),
    );
    runtime.discover(fixture.root()).await.unwrap();
    runtime.resolve(&"executor".into(), None).await.unwrap();
    runtime.resolve(&"formatter".into(), None).await.unwrap();

    assert_eq!(runtime.shutdown().await, 2);
    assert!(runtime.registry().is_empty().await);
    for module in loader.probe().instances() {
        assert_eq!(module.unmount_count(), 1);
    }
}

// ---- Test 7: Channel listener bookkeeping ----

#[tokio::test]
async fn test_rebind_keeps_single_listener() {
    let transport = Arc::new(RecordingTransport::new());
    let host = Arc::new(RecordingHostLink::new(ContextId(5)));
    let registry = Arc::new(ListenerRegistry::new(transport.clone(), host.clone()));
    let bridge = ChannelBridge::connect(
        registry.clone(),
        TetherConfig::default().bridge.context_query_timeout(),
    )
    .await
    .unwrap();

    bridge.on("a", |_| {});
    let second = bridge.on("a", |_| {});

    assert_eq!(registry.listener(ContextId(5), "a"), Some(second));
    assert_eq!(transport.listener_count("a"), 1);
    assert_eq!(transport.attach_count(), 2);
    assert_eq!(transport.detach_count(), 1);
    assert_eq!(host.queries(), 1);
}

#[tokio::test]
async fn test_unbind_all_sends_one_removal_per_channel() {
    let transport = Arc::new(RecordingTransport::new());
    let host = Arc::new(RecordingHostLink::new(ContextId(5)));
    let registry = Arc::new(ListenerRegistry::new(transport.clone(), host.clone()));
    let bridge = ChannelBridge::connect(registry.clone(), std::time::Duration::from_secs(1))
        .await
        .unwrap();

    for channel in ["stdout", "stderr", "exit"] {
        bridge.on(channel, |_| {});
    }
    assert_eq!(bridge.off_all(), 3);

    assert!(registry.channels(ContextId(5)).is_empty());
    assert!(registry.is_empty());
    assert_eq!(host.removals(), 3);
    assert_eq!(host.binds(), 3);
    assert!(
        host.notices()
            .iter()
            .all(|n| n.context() == ContextId(5))
    );

    drop(bridge);
    assert_eq!(host.removals(), 3);
}

#[tokio::test]
async fn test_router_tracks_live_contexts() {
    let router = Arc::new(ChannelRouter::new());
    let transport = Arc::new(RecordingTransport::new());

    let first_link = Arc::new(router.link());
    let second_link = Arc::new(router.link());
    let first = ChannelBridge::connect(
        Arc::new(ListenerRegistry::new(transport.clone(), first_link)),
        std::time::Duration::from_secs(1),
    )
    .await
    .unwrap();
    let second = ChannelBridge::connect(
        Arc::new(ListenerRegistry::new(transport.clone(), second_link)),
        std::time::Duration::from_secs(1),
    )
    .await
    .unwrap();

    first.on("terminal", |_| {});
    second.on("terminal", |_| {});
    assert_eq!(
        router.subscribers("terminal"),
        vec![first.context_id(), second.context_id()]
    );
    assert_eq!(transport.emit("terminal", json!("$ ")), 2);

    let gone = first.context_id();
    drop(first);
    assert_eq!(router.subscribers("terminal"), vec![second.context_id()]);
    assert!(!router.is_subscribed(gone, "terminal"));
}

#[tokio::test]
async fn test_unavailable_host_blocks_bridge() {
    let registry = Arc::new(ListenerRegistry::new(
        Arc::new(RecordingTransport::new()),
        Arc::new(RecordingHostLink::unavailable()),
    ));
    let err = ChannelBridge::connect(registry, std::time::Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("context id"));
}

#[test]
fn test_notice_wire_names() {
    let notice = HostNotice::Remove {
        context: ContextId(1),
        channel: "x".into(),
    };
    let value = serde_json::to_value(&notice).unwrap();
    assert_eq!(value["notice"], "ipc-core.remove-channel-listener");
}
