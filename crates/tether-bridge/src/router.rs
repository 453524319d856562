// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-side routing table built from remote listener notices.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tether_core::{BridgeError, ContextId};
use tracing::debug;

use crate::notice::HostNotice;
use crate::transport::HostLink;

/// Tracks which remote contexts listen on which channels, so the host only
/// routes a channel's traffic to live listeners.
#[derive(Default)]
pub struct ChannelRouter {
    routes: RwLock<HashMap<String, BTreeSet<ContextId>>>,
    next_context: AtomicU64,
}

impl ChannelRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a notice from a remote context.
    pub fn apply(&self, notice: &HostNotice) {
        let mut routes = self.write();
        match notice {
            HostNotice::Bind { context, channel } => {
                routes.entry(channel.clone()).or_default().insert(*context);
            }
            HostNotice::Remove { context, channel } => {
                if let Some(contexts) = routes.get_mut(channel) {
                    contexts.remove(context);
                    if contexts.is_empty() {
                        routes.remove(channel);
                    }
                }
            }
        }
        debug!(
            notice = notice.name(),
            context = %notice.context(),
            channel = notice.channel(),
            "applied listener notice"
        );
    }

    /// Contexts listening on `channel`, in ascending order.
    pub fn subscribers(&self, channel: &str) -> Vec<ContextId> {
        self.read()
            .get(channel)
            .map(|contexts| contexts.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_subscribed(&self, context: ContextId, channel: &str) -> bool {
        self.read()
            .get(channel)
            .is_some_and(|contexts| contexts.contains(&context))
    }

    /// Forgets every subscription of a context that went away without
    /// unbinding. Returns the number of channels it was removed from.
    pub fn drop_context(&self, context: ContextId) -> usize {
        let mut routes = self.write();
        let mut removed = 0;
        routes.retain(|_, contexts| {
            if contexts.remove(&context) {
                removed += 1;
            }
            !contexts.is_empty()
        });
        removed
    }

    /// Channels with at least one subscriber, sorted.
    pub fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.read().keys().cloned().collect();
        channels.sort();
        channels
    }

    /// An in-process host link for a new remote context.
    pub fn link(self: &Arc<Self>) -> LoopbackLink {
        let context = ContextId(self.next_context.fetch_add(1, Ordering::Relaxed) + 1);
        LoopbackLink {
            context,
            router: Arc::clone(self),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, BTreeSet<ContextId>>> {
        self.routes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, BTreeSet<ContextId>>> {
        self.routes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ChannelRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRouter")
            .field("channels", &self.channels())
            .finish()
    }
}

/// [`HostLink`] that applies notices straight to a [`ChannelRouter`] in the
/// same process.
#[derive(Debug, Clone)]
pub struct LoopbackLink {
    context: ContextId,
    router: Arc<ChannelRouter>,
}

impl LoopbackLink {
    pub fn context(&self) -> ContextId {
        self.context
    }
}

#[async_trait]
impl HostLink for LoopbackLink {
    async fn query_context_id(&self) -> Result<ContextId, BridgeError> {
        Ok(self.context)
    }

    fn send(&self, notice: HostNotice) {
        self.router.apply(&notice);
    }
}
