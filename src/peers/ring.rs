//! Consistent Hash Ring
//!
//! Maps keys onto node addresses using virtual nodes.

use std::collections::{HashMap, HashSet};

/// Hash function used to place nodes and keys on the ring.
pub type HashFn = fn(&[u8]) -> u32;

/// Virtual nodes per real node when none is configured.
pub const DEFAULT_REPLICAS: usize = 50;

// == Hash Ring ==
/// Consistent-hash routing table.
///
/// Each real node is placed on the ring `replicas` times, at the hash of
/// `"{i}{node}"` for `i` in `0..replicas`. A key belongs to the first virtual
/// node clockwise from its own hash.
#[derive(Debug, Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Virtual node hashes, ascending
    keys: Vec<u32>,
    hash_map: HashMap<u32, String>,
    nodes: HashSet<String>,
}

impl HashRing {
    /// Creates an empty ring; `hash` defaults to CRC-32 (IEEE).
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or(crc32fast::hash),
            replicas,
            keys: Vec::new(),
            hash_map: HashMap::new(),
            nodes: HashSet::new(),
        }
    }

    // == Add ==
    /// Places nodes on the ring. Nodes already present are skipped.
    pub fn add<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for node in nodes {
            let node = node.as_ref();
            if !self.nodes.insert(node.to_string()) {
                continue;
            }
            for i in 0..self.replicas {
                let hash = (self.hash)(format!("{}{}", i, node).as_bytes());
                self.keys.push(hash);
                self.hash_map.insert(hash, node.to_string());
            }
        }
        self.keys.sort_unstable();
    }

    // == Get ==
    /// Returns the node owning `key`, or `None` for an empty ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&h| h < hash);
        let slot = self.keys[idx % self.keys.len()];
        self.hash_map.get(&slot).map(String::as_str)
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }
}
