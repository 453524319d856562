// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel bridge between isolated remote contexts and the host.
//!
//! Remote contexts install channel listeners through a [`ChannelBridge`];
//! the [`ListenerRegistry`] keeps one listener per (context, channel) pair
//! and tells the host about every change, and the host-side
//! [`ChannelRouter`] turns those notices into a routing table.

pub mod bridge;
pub mod notice;
pub mod registry;
pub mod router;
pub mod transport;

pub use bridge::{ChannelBridge, DEFAULT_CONTEXT_QUERY_TIMEOUT};
pub use notice::{BIND_NOTICE, CONTEXT_ID_QUERY, HostNotice, REMOVE_NOTICE};
pub use registry::ListenerRegistry;
pub use router::{ChannelRouter, LoopbackLink};
pub use transport::{
    ChannelEvent, ChannelTransport, HostLink, Listener, ListenerHandle, LocalTransport,
};
