// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote-side channel bridge for one remote context.

use std::sync::Arc;
use std::time::Duration;

use tether_core::{BridgeError, ContextId};
use tracing::{info, warn};

use crate::registry::ListenerRegistry;
use crate::transport::{ChannelEvent, ListenerHandle};

/// Default bound on the context id round trip.
pub const DEFAULT_CONTEXT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Channel access for one remote context.
///
/// The context id is queried from the host once, in [`connect`](Self::connect),
/// and tags every later bind and unbind. Dropping the bridge removes all of
/// the context's listeners.
pub struct ChannelBridge {
    context: ContextId,
    registry: Arc<ListenerRegistry>,
}

impl ChannelBridge {
    /// Asks the host for this context's id and returns a bridge bound to it.
    pub async fn connect(
        registry: Arc<ListenerRegistry>,
        timeout: Duration,
    ) -> Result<Self, BridgeError> {
        let context = match tokio::time::timeout(timeout, registry.host().query_context_id()).await
        {
            Ok(Ok(context)) => context,
            Ok(Err(e)) => {
                warn!(error = %e, "context id query failed");
                return Err(e);
            }
            Err(_elapsed) => {
                warn!(timeout_secs = timeout.as_secs(), "context id query timed out");
                return Err(BridgeError::Timeout { duration: timeout });
            }
        };
        info!(context = %context, "channel bridge connected");
        Ok(Self { context, registry })
    }

    pub fn context_id(&self) -> ContextId {
        self.context
    }

    /// Listens on `channel`, replacing this context's previous listener there.
    pub fn on<F>(&self, channel: &str, listener: F) -> ListenerHandle
    where
        F: Fn(&ChannelEvent) + Send + Sync + 'static,
    {
        self.registry.bind(self.context, channel, Arc::new(listener))
    }

    /// Stops listening on `channel`. Returns false if nothing was bound.
    pub fn off(&self, channel: &str) -> bool {
        self.registry.unbind(self.context, channel)
    }

    /// Stops listening on every channel. Returns the number removed.
    pub fn off_all(&self) -> usize {
        self.registry.unbind_all(self.context)
    }

    /// Channels this context listens on, sorted.
    pub fn channels(&self) -> Vec<String> {
        self.registry.channels(self.context)
    }
}

impl Drop for ChannelBridge {
    fn drop(&mut self) {
        self.registry.unbind_all(self.context);
    }
}

impl std::fmt::Debug for ChannelBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelBridge")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::notice::HostNotice;
    use crate::transport::{HostLink, LocalTransport};

    #[derive(Default)]
    struct Host {
        queries: AtomicUsize,
        notices: Mutex<Vec<HostNotice>>,
        unavailable: bool,
        stall: bool,
    }

    #[async_trait]
    impl HostLink for Host {
        async fn query_context_id(&self) -> Result<ContextId, BridgeError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if self.stall {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.unavailable {
                return Err(BridgeError::ContextUnavailable {
                    source: "host not ready".into(),
                });
            }
            Ok(ContextId(12))
        }

        fn send(&self, notice: HostNotice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    fn registry(host: Arc<Host>) -> (Arc<ListenerRegistry>, Arc<LocalTransport>) {
        let transport = Arc::new(LocalTransport::new());
        (
            Arc::new(ListenerRegistry::new(transport.clone(), host)),
            transport,
        )
    }

    #[tokio::test]
    async fn context_id_is_queried_once() {
        let host = Arc::new(Host::default());
        let (registry, transport) = registry(host.clone());
        let bridge = ChannelBridge::connect(registry, DEFAULT_CONTEXT_QUERY_TIMEOUT)
            .await
            .unwrap();

        bridge.on("a", |_| {});
        bridge.on("b", |_| {});
        bridge.off("a");

        assert_eq!(host.queries.load(Ordering::SeqCst), 1);
        assert_eq!(bridge.context_id(), ContextId(12));
        assert_eq!(bridge.channels(), vec!["b"]);
        assert_eq!(transport.listener_count("a"), 0);
        assert!(
            host.notices
                .lock()
                .unwrap()
                .iter()
                .all(|n| n.context() == ContextId(12))
        );
    }

    #[tokio::test]
    async fn listeners_receive_events() {
        let host = Arc::new(Host::default());
        let (registry, transport) = registry(host);
        let bridge = ChannelBridge::connect(registry, DEFAULT_CONTEXT_QUERY_TIMEOUT)
            .await
            .unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        bridge.on("terminal.output", move |event| {
            sink.lock().unwrap().push(event.payload.clone());
        });
        transport.emit("terminal.output", json!("$ ls"));
        assert_eq!(*received.lock().unwrap(), vec![json!("$ ls")]);
    }

    #[tokio::test]
    async fn drop_removes_all_listeners() {
        let host = Arc::new(Host::default());
        let (registry, transport) = registry(host.clone());
        let bridge = ChannelBridge::connect(registry.clone(), DEFAULT_CONTEXT_QUERY_TIMEOUT)
            .await
            .unwrap();
        bridge.on("a", |_| {});
        bridge.on("b", |_| {});

        drop(bridge);
        assert!(registry.is_empty());
        assert_eq!(transport.listener_count("a"), 0);
        let removals = host
            .notices
            .lock()
            .unwrap()
            .iter()
            .filter(|n| matches!(n, HostNotice::Remove { .. }))
            .count();
        assert_eq!(removals, 2);
    }

    #[tokio::test]
    async fn unavailable_host_fails_connect() {
        let host = Arc::new(Host {
            unavailable: true,
            ..Host::default()
        });
        let (registry, _) = registry(host);
        let err = ChannelBridge::connect(registry, DEFAULT_CONTEXT_QUERY_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::ContextUnavailable { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_host_times_out() {
        let host = Arc::new(Host {
            stall: true,
            ..Host::default()
        });
        let (registry, _) = registry(host);
        let err = ChannelBridge::connect(registry, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Timeout { .. }));
    }
}
