//! Peer Server
//!
//! Tracks the peer set and routes keys through the hash ring. The HTTP side
//! of the protocol lives in [`crate::api`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::{build_http_client, HashFn, HashRing, HttpPeerClient, PeerClient, PeerRouter};
use crate::error::Result;

/// Path prefix for all peer traffic.
pub const DEFAULT_BASE_PATH: &str = "/_cache/";

// == Peer Options ==
#[derive(Debug, Clone)]
pub struct PeerOptions {
    /// Prefix of every peer request path
    pub base_path: String,
    /// Virtual nodes per peer
    pub replicas: usize,
    /// Upper bound for a single peer fetch
    pub timeout: Duration,
    /// Ring hash, CRC-32 when `None`
    pub hash: Option<HashFn>,
}

impl Default for PeerOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: super::DEFAULT_REPLICAS,
            timeout: Duration::from_secs(2),
            hash: None,
        }
    }
}

struct PeerSet {
    ring: HashRing,
    clients: HashMap<String, Arc<HttpPeerClient>>,
}

// == Peer Server ==
/// The peer pool of one process.
///
/// `self_addr` is this process's own base URL as it appears in the peer
/// list, e.g. `http://localhost:8001`.
pub struct PeerServer {
    self_addr: String,
    base_path: String,
    replicas: usize,
    hash: Option<HashFn>,
    http: reqwest::Client,
    peers: RwLock<PeerSet>,
}

impl PeerServer {
    // == Constructor ==
    pub fn new(self_addr: impl Into<String>, options: PeerOptions) -> Result<Self> {
        let self_addr: String = self_addr.into();
        let http = build_http_client(options.timeout)?;

        Ok(Self {
            self_addr: self_addr.trim_end_matches('/').to_string(),
            base_path: normalize_base_path(&options.base_path),
            replicas: options.replicas,
            hash: options.hash,
            http,
            peers: RwLock::new(PeerSet {
                ring: HashRing::new(options.replicas, options.hash),
                clients: HashMap::new(),
            }),
        })
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    // == Set ==
    /// Replaces the peer set. The ring and the client map are rebuilt from
    /// scratch.
    pub fn set<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers
            .into_iter()
            .map(|p| p.as_ref().trim_end_matches('/').to_string())
            .collect();

        let mut ring = HashRing::new(self.replicas, self.hash);
        ring.add(&peers);

        let clients = peers
            .iter()
            .map(|peer| {
                let client = HttpPeerClient::new(
                    format!("{}{}", peer, self.base_path),
                    self.http.clone(),
                );
                (peer.clone(), Arc::new(client))
            })
            .collect();

        *self.peers.write() = PeerSet { ring, clients };
        info!("[Server {}] peer set updated: {:?}", self.self_addr, peers);
    }

    /// Known peer addresses, sorted.
    pub fn peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.peers.read().clients.keys().cloned().collect();
        peers.sort();
        peers
    }
}

impl PeerRouter for PeerServer {
    // == Pick Peer ==
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerClient>> {
        let peers = self.peers.read();
        let owner = peers.ring.get(key)?;
        if owner == self.self_addr {
            return None;
        }

        debug!("[Server {}] pick peer {} for {}", self.self_addr, owner, key);
        peers
            .clients
            .get(owner)
            .map(|client| client.clone() as Arc<dyn PeerClient>)
    }
}

impl std::fmt::Debug for PeerServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerServer")
            .field("self_addr", &self.self_addr)
            .field("base_path", &self.base_path)
            .field("peers", &self.peers())
            .finish()
    }
}

/// Ensures the base path starts and ends with `/`.
fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
