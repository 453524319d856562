// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport and host-link seams of the channel bridge.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tether_core::{BridgeError, ContextId};

use crate::notice::HostNotice;

/// A message delivered on a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEvent {
    pub channel: String,
    pub payload: serde_json::Value,
}

/// Callback invoked for every event on the channel it is attached to.
pub type Listener = Arc<dyn Fn(&ChannelEvent) + Send + Sync>;

/// Opaque handle identifying one attached listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Delivers channel events to attached listeners.
pub trait ChannelTransport: Send + Sync {
    /// Attaches `listener` to `channel`.
    fn attach(&self, channel: &str, listener: Listener) -> ListenerHandle;

    /// Detaches a listener. Returns false if it was not attached.
    fn detach(&self, channel: &str, handle: ListenerHandle) -> bool;
}

/// Connection from a remote context to the host process.
#[async_trait]
pub trait HostLink: Send + Sync {
    /// Asks the host which context this link belongs to.
    async fn query_context_id(&self) -> Result<ContextId, BridgeError>;

    /// Sends a listener notice to the host.
    fn send(&self, notice: HostNotice);
}

type ListenerTable = HashMap<String, Vec<(ListenerHandle, Listener)>>;

/// In-process [`ChannelTransport`].
#[derive(Default)]
pub struct LocalTransport {
    next: AtomicU64,
    listeners: Mutex<ListenerTable>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `payload` to every listener on `channel`. Returns the number
    /// of listeners reached.
    pub fn emit(&self, channel: &str, payload: serde_json::Value) -> usize {
        // Listeners run outside the lock so they may attach or detach.
        let targets: Vec<Listener> = self
            .table()
            .get(channel)
            .map(|attached| attached.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default();
        let event = ChannelEvent {
            channel: channel.to_string(),
            payload,
        };
        for listener in &targets {
            listener(&event);
        }
        targets.len()
    }

    /// Number of listeners attached to `channel`.
    pub fn listener_count(&self, channel: &str) -> usize {
        self.table().get(channel).map_or(0, Vec::len)
    }

    fn table(&self) -> MutexGuard<'_, ListenerTable> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChannelTransport for LocalTransport {
    fn attach(&self, channel: &str, listener: Listener) -> ListenerHandle {
        let handle = ListenerHandle(self.next.fetch_add(1, Ordering::Relaxed));
        self.table()
            .entry(channel.to_string())
            .or_default()
            .push((handle, listener));
        handle
    }

    fn detach(&self, channel: &str, handle: ListenerHandle) -> bool {
        let mut table = self.table();
        let Some(attached) = table.get_mut(channel) else {
            return false;
        };
        let before = attached.len();
        attached.retain(|(h, _)| *h != handle);
        let removed = attached.len() != before;
        if attached.is_empty() {
            table.remove(channel);
        }
        removed
    }
}

impl std::fmt::Debug for LocalTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut channels: Vec<String> = self.table().keys().cloned().collect();
        channels.sort();
        f.debug_struct("LocalTransport")
            .field("channels", &channels)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use serde_json::json;

    use super::*;

    fn counter() -> (Listener, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let listener: Listener = Arc::new(move |_event: &ChannelEvent| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (listener, hits)
    }

    #[test]
    fn emit_reaches_attached_listeners_only() {
        let transport = LocalTransport::new();
        let (a, a_hits) = counter();
        let (b, b_hits) = counter();
        transport.attach("logs", a);
        transport.attach("metrics", b);

        assert_eq!(transport.emit("logs", json!("line")), 1);
        assert_eq!(a_hits.load(Ordering::SeqCst), 1);
        assert_eq!(b_hits.load(Ordering::SeqCst), 0);
        assert_eq!(transport.emit("nobody", json!(null)), 0);
    }

    #[test]
    fn detach_stops_delivery() {
        let transport = LocalTransport::new();
        let (a, hits) = counter();
        let handle = transport.attach("logs", a);

        assert!(transport.detach("logs", handle));
        assert!(!transport.detach("logs", handle));
        assert_eq!(transport.emit("logs", json!(1)), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(transport.listener_count("logs"), 0);
    }

    #[test]
    fn handles_are_unique() {
        let transport = LocalTransport::new();
        let (a, _) = counter();
        let first = transport.attach("x", a.clone());
        let second = transport.attach("x", a);
        assert_ne!(first, second);
        assert_eq!(transport.listener_count("x"), 2);
    }
}
