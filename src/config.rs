//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Url;

use crate::error::{CacheError, Result};
use crate::peers::{PeerOptions, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// This node's base URL as listed in the peer set
    pub self_addr: String,
    /// Base URLs of all peers, optionally including `self_addr`
    pub peers: Vec<String>,
    /// Path prefix for peer traffic
    pub base_path: String,
    /// Byte budget of the demo group
    pub max_bytes: usize,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Timeout for a single peer fetch in milliseconds
    pub peer_timeout_ms: u64,
    /// Load locally when the owning peer fails
    pub peer_fallback: bool,
    /// Whether to start the front API server
    pub api_enabled: bool,
    /// Front API server port
    pub api_port: u16,
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_SELF_ADDR` - Own base URL (default: http://localhost:8001)
    /// - `CACHE_PEERS` - Comma-separated peer base URLs (default: own address)
    /// - `CACHE_BASE_PATH` - Peer path prefix (default: /_cache/)
    /// - `CACHE_MAX_BYTES` - Group byte budget (default: 2048)
    /// - `CACHE_REPLICAS` - Virtual nodes per peer (default: 50)
    /// - `PEER_TIMEOUT_MS` - Peer fetch timeout (default: 2000)
    /// - `PEER_FALLBACK` - Load locally when a peer fails (default: false)
    /// - `API_ENABLED` - Start the front API (default: false)
    /// - `API_PORT` - Front API port (default: 4000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let self_addr = env::var("CACHE_SELF_ADDR").unwrap_or(defaults.self_addr);

        let peers = env::var("CACHE_PEERS")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_addr.clone()]);

        Self {
            self_addr,
            peers,
            base_path: env::var("CACHE_BASE_PATH").unwrap_or(defaults.base_path),
            max_bytes: parsed("CACHE_MAX_BYTES", defaults.max_bytes),
            replicas: parsed("CACHE_REPLICAS", defaults.replicas),
            peer_timeout_ms: parsed("PEER_TIMEOUT_MS", defaults.peer_timeout_ms),
            peer_fallback: parsed("PEER_FALLBACK", defaults.peer_fallback),
            api_enabled: parsed("API_ENABLED", defaults.api_enabled),
            api_port: parsed("API_PORT", defaults.api_port),
        }
    }

    /// Options for this node's [`PeerServer`](crate::peers::PeerServer).
    pub fn peer_options(&self) -> PeerOptions {
        PeerOptions {
            base_path: self.base_path.clone(),
            replicas: self.replicas,
            timeout: Duration::from_millis(self.peer_timeout_ms),
            hash: None,
        }
    }

    /// Socket address the peer server binds to, derived from the port of
    /// `self_addr`.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let url = Url::parse(&self.self_addr).map_err(|e| {
            CacheError::Configuration(format!("invalid CACHE_SELF_ADDR {}: {}", self.self_addr, e))
        })?;
        let port = url.port_or_known_default().ok_or_else(|| {
            CacheError::Configuration(format!("no port in CACHE_SELF_ADDR {}", self.self_addr))
        })?;
        Ok(SocketAddr::from(([0, 0, 0, 0], port)))
    }

    /// Socket address of the front API server.
    pub fn api_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.api_port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            self_addr: "http://localhost:8001".to_string(),
            peers: vec!["http://localhost:8001".to_string()],
            base_path: DEFAULT_BASE_PATH.to_string(),
            max_bytes: 2 << 10,
            replicas: DEFAULT_REPLICAS,
            peer_timeout_ms: 2000,
            peer_fallback: false,
            api_enabled: false,
            api_port: 4000,
        }
    }
}
