// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-context channel listener bookkeeping.
//!
//! Each remote context holds at most one listener per channel. Binding a
//! channel again replaces the previous listener and detaches it from the
//! transport. Every change is reported to the host.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tether_core::ContextId;
use tracing::debug;

use crate::notice::HostNotice;
use crate::transport::{ChannelTransport, HostLink, Listener, ListenerHandle};

type Bindings = HashMap<ContextId, HashMap<String, ListenerHandle>>;

/// Tracks which listener each remote context has installed on each channel.
pub struct ListenerRegistry {
    transport: Arc<dyn ChannelTransport>,
    host: Arc<dyn HostLink>,
    bindings: Mutex<Bindings>,
}

impl ListenerRegistry {
    pub fn new(transport: Arc<dyn ChannelTransport>, host: Arc<dyn HostLink>) -> Self {
        Self {
            transport,
            host,
            bindings: Mutex::new(HashMap::new()),
        }
    }

    /// The host link notices are sent through.
    pub fn host(&self) -> &Arc<dyn HostLink> {
        &self.host
    }

    /// Binds `listener` to `channel` for `context`, replacing any previous
    /// listener of the same pair.
    ///
    /// Every call sends a `Bind` notice, including a rebind. A rebind sends no
    /// `Remove` for the replaced listener, so the host sees two `Bind` notices
    /// for one live binding. Hosts must treat bindings as a set, as
    /// [`ChannelRouter`](crate::ChannelRouter) does.
    pub fn bind(&self, context: ContextId, channel: &str, listener: Listener) -> ListenerHandle {
        let handle = self.transport.attach(channel, listener);
        let previous = self
            .table()
            .entry(context)
            .or_default()
            .insert(channel.to_string(), handle);
        if let Some(previous) = previous {
            self.transport.detach(channel, previous);
            debug!(context = %context, channel, "replaced channel listener");
        }
        self.host.send(HostNotice::Bind {
            context,
            channel: channel.to_string(),
        });
        debug!(context = %context, channel, "channel listener bound");
        handle
    }

    /// Removes the listener of one pair. Returns false if none was bound.
    pub fn unbind(&self, context: ContextId, channel: &str) -> bool {
        let removed = {
            let mut table = self.table();
            let Some(channels) = table.get_mut(&context) else {
                return false;
            };
            let removed = channels.remove(channel);
            if channels.is_empty() {
                table.remove(&context);
            }
            removed
        };
        match removed {
            Some(handle) => {
                self.release(context, channel, handle);
                true
            }
            None => false,
        }
    }

    /// Removes every listener of `context`, one removal notice per channel.
    /// Returns the number of listeners removed.
    pub fn unbind_all(&self, context: ContextId) -> usize {
        let Some(channels) = self.table().remove(&context) else {
            return 0;
        };
        let mut channels: Vec<_> = channels.into_iter().collect();
        channels.sort();
        for (channel, handle) in &channels {
            self.release(context, channel, *handle);
        }
        channels.len()
    }

    fn release(&self, context: ContextId, channel: &str, handle: ListenerHandle) {
        self.transport.detach(channel, handle);
        self.host.send(HostNotice::Remove {
            context,
            channel: channel.to_string(),
        });
        debug!(context = %context, channel, "channel listener removed");
    }

    /// Channels `context` listens on, sorted.
    pub fn channels(&self, context: ContextId) -> Vec<String> {
        let mut channels: Vec<String> = self
            .table()
            .get(&context)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default();
        channels.sort();
        channels
    }

    /// The listener bound for one pair, if any.
    pub fn listener(&self, context: ContextId, channel: &str) -> Option<ListenerHandle> {
        self.table().get(&context)?.get(channel).copied()
    }

    /// Contexts with at least one bound listener, sorted.
    pub fn contexts(&self) -> Vec<ContextId> {
        let mut contexts: Vec<ContextId> = self.table().keys().copied().collect();
        contexts.sort();
        contexts
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    fn table(&self) -> MutexGuard<'_, Bindings> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("contexts", &self.contexts())
            .finish_non_exhaustive()
    }
}
