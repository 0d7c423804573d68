//! Cache Shard Module
//!
//! Thread-safe wrapper around a single [`LruStore`] of [`ByteView`]s.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{ByteView, LruStore};

/// Shared eviction handler, handed to the store once it is created.
pub type EvictionHandler = Arc<dyn Fn(&str, &ByteView) + Send + Sync>;

// == Cache Shard ==
/// One mutex around one LRU store.
///
/// The store is only allocated by the first `add`, so a shard that never
/// receives a value costs nothing. The lock guards the map and recency list
/// only; loads never run while it is held.
pub struct CacheShard {
    store: Mutex<Option<LruStore<ByteView>>>,
    max_bytes: usize,
    on_evicted: Option<EvictionHandler>,
}

impl CacheShard {
    // == Constructor ==
    /// Creates an empty shard with the given byte budget (zero = unbounded).
    pub fn new(max_bytes: usize) -> Self {
        Self {
            store: Mutex::new(None),
            max_bytes,
            on_evicted: None,
        }
    }

    /// Creates a shard whose store reports evictions to `handler`.
    pub fn with_eviction_handler(max_bytes: usize, handler: EvictionHandler) -> Self {
        Self {
            on_evicted: Some(handler),
            ..Self::new(max_bytes)
        }
    }

    // == Add ==
    pub fn add(&self, key: &str, value: ByteView) {
        let mut guard = self.store.lock();
        let store = guard.get_or_insert_with(|| {
            let on_evicted = self.on_evicted.clone().map(|handler| {
                Box::new(move |key: &str, value: &ByteView| handler(key, value))
                    as crate::cache::OnEvicted<ByteView>
            });
            LruStore::new(self.max_bytes, on_evicted)
        });
        store.add(key, value);
    }

    // == Get ==
    /// Returns the cached view, marking it as recently used.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut guard = self.store.lock();
        guard.as_mut()?.get(key).cloned()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.store.lock().as_ref().map_or(0, |store| store.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes charged against the budget.
    pub fn bytes(&self) -> usize {
        self.store.lock().as_ref().map_or(0, |store| store.bytes())
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    #[cfg(test)]
    fn is_initialized(&self) -> bool {
        self.store.lock().is_some()
    }
}

impl std::fmt::Debug for CacheShard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheShard")
            .field("max_bytes", &self.max_bytes)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_store_created_lazily() {
        let shard = CacheShard::new(1024);
        assert!(shard.get("missing").is_none());
        assert!(!shard.is_initialized());

        shard.add("key", ByteView::from("value"));
        assert!(shard.is_initialized());
        assert_eq!(shard.get("key"), Some(ByteView::from("value")));
        assert_eq!(shard.bytes(), 8);
    }

    #[test]
    fn test_eviction_handler_is_invoked() {
        let evictions = Arc::new(AtomicUsize::new(0));
        let counter = evictions.clone();
        let shard = CacheShard::with_eviction_handler(
            4,
            Arc::new(move |_key: &str, _value: &ByteView| {
                counter.fetch_add(1, Ordering::Relaxed);
            }),
        );

        shard.add("a", ByteView::from("1"));
        shard.add("b", ByteView::from("1"));
        shard.add("c", ByteView::from("1"));

        assert_eq!(evictions.load(Ordering::Relaxed), 1);
        assert_eq!(shard.len(), 2);
        assert!(shard.get("a").is_none());
    }

    #[test]
    fn test_concurrent_adds_respect_budget() {
        let shard = Arc::new(CacheShard::new(256));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let shard = shard.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("t{}-{}", t, i);
                        shard.add(&key, ByteView::from("payload"));
                        let _ = shard.get(&key);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(shard.bytes() <= 256);
    }
}
