//! Cache Entry Module
//!
//! Defines the arena slot used by the LRU store.

// == Cache Entry ==
/// A single key/value pair plus its links in the recency list.
///
/// Links are arena indices rather than pointers; `None` marks a list end.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored key
    pub key: String,
    /// The stored value
    pub value: V,
    /// Neighbour towards the most recently used end
    pub(crate) prev: Option<usize>,
    /// Neighbour towards the least recently used end
    pub(crate) next: Option<usize>,
}

impl<V: ByteSize> CacheEntry<V> {
    // == Constructor ==
    /// Creates an unlinked entry.
    pub fn new(key: String, value: V) -> Self {
        Self {
            key,
            value,
            prev: None,
            next: None,
        }
    }

    // == Size ==
    /// Bytes charged against the store budget: key length plus value size.
    pub fn size(&self) -> usize {
        self.key.len() + self.value.byte_len()
    }
}

// == Byte Size ==
/// Values stored in the LRU report how many bytes they occupy.
pub trait ByteSize {
    fn byte_len(&self) -> usize;
}

impl ByteSize for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteSize for String {
    fn byte_len(&self) -> usize {
        self.len()
    }
}
