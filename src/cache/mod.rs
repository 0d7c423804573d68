//! Cache Module
//!
//! Provides the byte-budgeted LRU store, its thread-safe shard wrapper and
//! the immutable value view they hold.

mod byteview;
mod entry;
mod lru;
mod shard;
mod stats;


// Re-export public types
pub use byteview::ByteView;
pub use entry::{ByteSize, CacheEntry};
pub use lru::{LruStore, OnEvicted};
pub use shard::{CacheShard, EvictionHandler};
pub use stats::{CacheStats, StatsRecorder};
