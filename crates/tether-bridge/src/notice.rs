// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notices a remote context sends to the host about its channel listeners.

use serde::{Deserialize, Serialize};
use tether_core::ContextId;

/// Request a remote context sends to learn its own context id.
pub const CONTEXT_ID_QUERY: &str = "ipc-core.get-current-webcontents-id";

/// Notice name for a newly bound listener.
pub const BIND_NOTICE: &str = "ipc-core.bind-channel-listener";

/// Notice name for a removed listener.
pub const REMOVE_NOTICE: &str = "ipc-core.remove-channel-listener";

/// Listener change reported to the host so it routes a channel only to
/// contexts that listen on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "notice")]
pub enum HostNotice {
    #[serde(rename = "ipc-core.bind-channel-listener")]
    Bind {
        #[serde(rename = "webContentId")]
        context: ContextId,
        channel: String,
    },
    #[serde(rename = "ipc-core.remove-channel-listener")]
    Remove {
        #[serde(rename = "webContentId")]
        context: ContextId,
        channel: String,
    },
}

impl HostNotice {
    /// Wire name of the notice.
    pub fn name(&self) -> &'static str {
        match self {
            HostNotice::Bind { .. } => BIND_NOTICE,
            HostNotice::Remove { .. } => REMOVE_NOTICE,
        }
    }

    pub fn context(&self) -> ContextId {
        match self {
            HostNotice::Bind { context, .. } | HostNotice::Remove { context, .. } => *context,
        }
    }

    pub fn channel(&self) -> &str {
        match self {
            HostNotice::Bind { channel, .. } | HostNotice::Remove { channel, .. } => channel,
        }
    }
}
