// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bridge endpoints that record the traffic passing through them.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tether_bridge::{
    CONTEXT_ID_QUERY, ChannelTransport, HostLink, HostNotice, Listener, ListenerHandle,
    LocalTransport,
};
use tether_core::{BridgeError, ContextId};

/// In-process transport that counts attach and detach calls.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    inner: LocalTransport,
    attached: AtomicUsize,
    detached: AtomicUsize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `payload` to the listeners on `channel`.
    pub fn emit(&self, channel: &str, payload: serde_json::Value) -> usize {
        self.inner.emit(channel, payload)
    }

    pub fn listener_count(&self, channel: &str) -> usize {
        self.inner.listener_count(channel)
    }

    pub fn attach_count(&self) -> usize {
        self.attached.load(Ordering::SeqCst)
    }

    /// Number of detach calls that removed a listener.
    pub fn detach_count(&self) -> usize {
        self.detached.load(Ordering::SeqCst)
    }
}

impl ChannelTransport for RecordingTransport {
    fn attach(&self, channel: &str, listener: Listener) -> ListenerHandle {
        self.attached.fetch_add(1, Ordering::SeqCst);
        self.inner.attach(channel, listener)
    }

    fn detach(&self, channel: &str, handle: ListenerHandle) -> bool {
        let removed = self.inner.detach(channel, handle);
        if removed {
            self.detached.fetch_add(1, Ordering::SeqCst);
        }
        removed
    }
}

/// Host link answering with a fixed context id and recording every notice.
#[derive(Debug)]
pub struct RecordingHostLink {
    context: Option<ContextId>,
    requests: Mutex<Vec<String>>,
    notices: Mutex<Vec<HostNotice>>,
}

impl RecordingHostLink {
    pub fn new(context: ContextId) -> Self {
        Self {
            context: Some(context),
            requests: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
        }
    }

    /// A link whose host never reports a context id.
    pub fn unavailable() -> Self {
        Self {
            context: None,
            requests: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
        }
    }

    /// Number of context id queries received.
    pub fn queries(&self) -> usize {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .filter(|r| r.as_str() == CONTEXT_ID_QUERY)
            .count()
    }

    pub fn notices(&self) -> Vec<HostNotice> {
        self.notices.lock().expect("notices lock").clone()
    }

    pub fn binds(&self) -> usize {
        self.count(|n| matches!(n, HostNotice::Bind { .. }))
    }

    pub fn removals(&self) -> usize {
        self.count(|n| matches!(n, HostNotice::Remove { .. }))
    }

    fn count(&self, pred: impl Fn(&HostNotice) -> bool) -> usize {
        self.notices
            .lock()
            .expect("notices lock")
            .iter()
            .filter(|n| pred(n))
            .count()
    }
}

#[async_trait]
impl HostLink for RecordingHostLink {
    async fn query_context_id(&self) -> Result<ContextId, BridgeError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(CONTEXT_ID_QUERY.to_string());
        self.context.ok_or_else(|| BridgeError::ContextUnavailable {
            source: "no context id assigned".into(),
        })
    }

    fn send(&self, notice: HostNotice) {
        self.notices.lock().expect("notices lock").push(notice);
    }
}
