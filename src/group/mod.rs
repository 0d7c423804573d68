//! Group Module
//!
//! A group is a named cache namespace: one local shard, one loader and an
//! optional peer router. [`Group::get`] ties them together:
//!
//! 1. empty keys return an empty view
//! 2. shard hits return immediately
//! 3. misses are coalesced per key, then loaded from the owning peer or,
//!    when this process owns the key, from the loader
//! 4. successful loads populate the shard; failures are never cached

mod getter;
mod registry;
mod singleflight;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use crate::cache::{ByteView, CacheShard, CacheStats, StatsRecorder};
use crate::error::{CacheError, Result};
use crate::peers::{PeerClient, PeerRouter};

pub use getter::{BlockingGetterFunc, Getter, GetterFunc};
pub use registry::GroupRegistry;
pub use singleflight::CallCoalescer;

// == Group ==
pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: CacheShard,
    peers: OnceLock<Arc<dyn PeerRouter>>,
    loader: CallCoalescer<ByteView>,
    local_fallback: AtomicBool,
    stats: Arc<StatsRecorder>,
}

impl Group {
    // == Constructor ==
    /// Groups are created through [`GroupRegistry::register`].
    pub(crate) fn new(name: String, max_bytes: usize, getter: Arc<dyn Getter>) -> Self {
        let stats = Arc::new(StatsRecorder::new());
        let recorder = stats.clone();
        let main_cache = CacheShard::with_eviction_handler(
            max_bytes,
            Arc::new(move |_key: &str, _value: &ByteView| recorder.record_eviction()),
        );

        Self {
            name,
            getter,
            main_cache,
            peers: OnceLock::new(),
            loader: CallCoalescer::new(),
            local_fallback: AtomicBool::new(false),
            stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Attaches the router used to find the owner of a key. Allowed once.
    pub fn register_peers(&self, peers: Arc<dyn PeerRouter>) -> Result<()> {
        self.peers.set(peers).map_err(|_| {
            CacheError::Configuration(format!(
                "peers already registered for group {}",
                self.name
            ))
        })
    }

    /// When enabled, a failed remote fetch is retried once with the local loader.
    pub fn set_local_fallback(&self, enabled: bool) {
        self.local_fallback.store(enabled, Ordering::Relaxed);
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a miss.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Ok(ByteView::default());
        }
        self.stats.record_get();

        if let Some(value) = self.main_cache.get(key) {
            self.stats.record_hit();
            debug!("[Cache {}] hit {}", self.name, key);
            return Ok(value);
        }

        self.loader.work(key, || self.load(key)).await
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.stats
            .snapshot(self.main_cache.len(), self.main_cache.bytes())
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        self.stats.record_load();

        let peer = self.peers.get().and_then(|router| router.pick_peer(key));
        if let Some(peer) = peer {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    self.stats.record_peer_error();
                    if !self.local_fallback.load(Ordering::Relaxed) {
                        warn!("[Cache {}] failed to get {} from peer: {}", self.name, key, err);
                        return Err(err);
                    }
                    warn!(
                        "[Cache {}] failed to get {} from peer, loading locally: {}",
                        self.name, key, err
                    );
                }
            }
        }

        self.get_locally(key).await
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = self.getter.get(key).await.map_err(|err| {
            self.stats.record_loader_error();
            debug!("[Cache {}] loader failed for {}: {}", self.name, key, err);
            err
        })?;
        self.stats.record_local_load();

        let value = ByteView::from(bytes);
        self.populate_cache(key, &value);
        Ok(value)
    }

    async fn get_from_peer(&self, peer: &dyn PeerClient, key: &str) -> Result<ByteView> {
        let bytes = peer.fetch(&self.name, key).await?;
        self.stats.record_peer_load();
        info!("[Cache {}] fetched {} from peer", self.name, key);

        let value = ByteView::new(bytes);
        self.populate_cache(key, &value);
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: &ByteView) {
        self.main_cache.add(key, value.clone());
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("main_cache", &self.main_cache)
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}
