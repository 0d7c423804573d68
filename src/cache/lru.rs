//! LRU Store Module
//!
//! Byte-budgeted least recently used store.

use std::collections::HashMap;

use crate::cache::{ByteSize, CacheEntry};

/// Handler invoked with every evicted key/value pair.
pub type OnEvicted<V> = Box<dyn FnMut(&str, &V) + Send>;

// == LRU Store ==
/// Keeps entries within a byte budget, evicting the least recently used
/// entry first.
///
/// Entries live in an arena (`slots`) and are chained into a doubly linked
/// list by index:
/// - `head` = Most recently used
/// - `tail` = Least recently used
///
/// A `max_bytes` of zero means the store is unbounded. The store is not
/// synchronized; see [`CacheShard`](crate::cache::CacheShard).
pub struct LruStore<V> {
    /// Arena of entries, `None` marks a free slot
    slots: Vec<Option<CacheEntry<V>>>,
    /// Free slot indices available for reuse
    free: Vec<usize>,
    /// Key to slot index
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    /// Bytes currently charged (keys plus values)
    nbytes: usize,
    /// Byte budget, zero = unbounded
    max_bytes: usize,
    /// Optional eviction handler
    on_evicted: Option<OnEvicted<V>>,
}

impl<V: ByteSize> LruStore<V> {
    // == Constructor ==
    /// Creates an empty store with the given byte budget.
    pub fn new(max_bytes: usize, on_evicted: Option<OnEvicted<V>>) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            nbytes: 0,
            max_bytes,
            on_evicted,
        }
    }

    // == Get ==
    /// Looks up a key and marks it as most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        self.slots[idx].as_ref().map(|entry| &entry.value)
    }

    // == Add ==
    /// Inserts or replaces a value, then evicts until within budget.
    ///
    /// A single value larger than the whole budget is evicted right away,
    /// together with everything older than it.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();

        if let Some(&idx) = self.index.get(&key) {
            self.move_to_front(idx);
            if let Some(entry) = self.slots[idx].as_mut() {
                self.nbytes = self.nbytes - entry.value.byte_len() + value.byte_len();
                entry.value = value;
            }
        } else {
            let entry = CacheEntry::new(key.clone(), value);
            self.nbytes += entry.size();
            let idx = self.alloc(entry);
            self.index.insert(key, idx);
            self.push_front(idx);
        }

        while self.max_bytes != 0 && self.nbytes > self.max_bytes {
            self.remove_oldest();
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, if any.
    pub fn remove_oldest(&mut self) {
        let Some(idx) = self.tail else {
            return;
        };

        self.unlink(idx);
        if let Some(entry) = self.slots[idx].take() {
            self.free.push(idx);
            self.index.remove(&entry.key);
            self.nbytes -= entry.size();
            if let Some(on_evicted) = self.on_evicted.as_mut() {
                on_evicted(&entry.key, &entry.value);
            }
        }
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently charged against the budget.
    pub fn bytes(&self) -> usize {
        self.nbytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Key that would be evicted next.
    #[cfg(test)]
    pub(crate) fn peek_oldest(&self) -> Option<&str> {
        self.tail
            .and_then(|idx| self.slots[idx].as_ref())
            .map(|entry| entry.key.as_str())
    }

    /// Keys from most to least recently used.
    #[cfg(test)]
    pub(crate) fn keys_by_recency(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let Some(entry) = self.slots[idx].as_ref() else {
                break;
            };
            keys.push(entry.key.clone());
            cursor = entry.next;
        }
        keys
    }

    // == Arena / List Plumbing ==
    fn alloc(&mut self, entry: CacheEntry<V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                idx
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        }
    }

    fn links(&self, idx: usize) -> (Option<usize>, Option<usize>) {
        self.slots[idx]
            .as_ref()
            .map_or((None, None), |entry| (entry.prev, entry.next))
    }

    fn set_prev(&mut self, idx: usize, prev: Option<usize>) {
        if let Some(entry) = self.slots[idx].as_mut() {
            entry.prev = prev;
        }
    }

    fn set_next(&mut self, idx: usize, next: Option<usize>) {
        if let Some(entry) = self.slots[idx].as_mut() {
            entry.next = next;
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = self.links(idx);

        match prev {
            Some(p) => self.set_next(p, next),
            None => self.head = next,
        }
        match next {
            Some(n) => self.set_prev(n, prev),
            None => self.tail = prev,
        }

        self.set_prev(idx, None);
        self.set_next(idx, None);
    }

    fn push_front(&mut self, idx: usize) {
        self.set_prev(idx, None);
        self.set_next(idx, self.head);
        match self.head {
            Some(old_head) => self.set_prev(old_head, Some(idx)),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }
}

impl<V> std::fmt::Debug for LruStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruStore")
            .field("len", &self.index.len())
            .field("nbytes", &self.nbytes)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}
