//! Group Registry
//!
//! Name to group lookup shared by the API and peer servers.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::{Getter, Group};
use crate::error::{CacheError, Result};

// == Group Registry ==
/// Holds every group of a process.
///
/// Constructed once at startup and shared by `Arc`; tests build their own
/// isolated registries. Lookups take a read lock, registration a write lock.
#[derive(Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Creates a group with a `max_bytes` budget (zero = unbounded).
    ///
    /// Group names are unique; registering a name twice is a configuration
    /// error.
    pub fn register(
        &self,
        name: impl Into<String>,
        max_bytes: usize,
        getter: impl Getter + 'static,
    ) -> Result<Arc<Group>> {
        let name = name.into();
        let mut groups = self.groups.write();
        if groups.contains_key(&name) {
            return Err(CacheError::Configuration(format!(
                "group {} is already registered",
                name
            )));
        }

        let group = Arc::new(Group::new(name.clone(), max_bytes, Arc::new(getter)));
        groups.insert(name.clone(), group.clone());
        info!("Registered group {} with max_bytes={}", name, max_bytes);
        Ok(group)
    }

    // == Lookup ==
    pub fn lookup(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Registered group names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}
