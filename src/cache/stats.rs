//! Cache Statistics Module
//!
//! Tracks group performance metrics including hits, loads and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Recorder ==
/// Lock-free counters updated from concurrent requests.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    gets: AtomicU64,
    hits: AtomicU64,
    loads: AtomicU64,
    local_loads: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
    loader_errors: AtomicU64,
    evictions: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A coalesced load actually ran (once per key per miss burst).
    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_local_load(&self) {
        self.local_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_load(&self) {
        self.peer_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_error(&self) {
        self.peer_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_loader_error(&self) {
        self.loader_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the counters into a serializable snapshot.
    pub fn snapshot(&self, entries: usize, bytes: usize) -> CacheStats {
        CacheStats {
            gets: self.gets.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            local_loads: self.local_loads.load(Ordering::Relaxed),
            peer_loads: self.peer_loads.load(Ordering::Relaxed),
            peer_errors: self.peer_errors.load(Ordering::Relaxed),
            loader_errors: self.loader_errors.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            total_entries: entries,
            total_bytes: bytes,
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of a group's counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Calls to `Group::get` with a non-empty key
    pub gets: u64,
    /// Gets served from the local shard
    pub hits: u64,
    /// Loads executed after coalescing
    pub loads: u64,
    /// Loads answered by the local loader
    pub local_loads: u64,
    /// Loads answered by a remote peer
    pub peer_loads: u64,
    /// Failed remote fetches
    pub peer_errors: u64,
    /// Failed local loads
    pub loader_errors: u64,
    /// Entries evicted due to the byte budget
    pub evictions: u64,
    /// Current number of entries in the shard
    pub total_entries: usize,
    /// Bytes currently charged in the shard
    pub total_bytes: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / gets, or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.hits as f64 / self.gets as f64
        }
    }
}
