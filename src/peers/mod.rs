//! Peers Module
//!
//! Routing keys to the process that owns them and fetching values from it.
//!
//! - [`PeerRouter`] picks the owner of a key; `None` means this process
//! - [`PeerClient`] fetches a group/key pair from one remote peer
//! - [`PeerServer`] implements the router over a [`HashRing`] of HTTP peers

mod client;
mod ring;
mod server;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

pub use client::{build_http_client, HttpPeerClient};
pub use ring::{HashFn, HashRing, DEFAULT_REPLICAS};
pub use server::{PeerOptions, PeerServer, DEFAULT_BASE_PATH};

/// Finds the peer that owns a key.
pub trait PeerRouter: Send + Sync {
    /// Returns the owning remote peer, or `None` when the key should be
    /// loaded by this process.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerClient>>;
}

/// Fetches cached values from a remote peer.
#[async_trait]
pub trait PeerClient: Send + Sync {
    async fn fetch(&self, group: &str, key: &str) -> Result<Bytes>;
}
