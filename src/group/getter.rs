//! Loader callbacks used on a cache miss.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{CacheError, Result};

/// Loads the authoritative value for a key, e.g. from a database.
///
/// Return [`CacheError::NotFound`](crate::error::CacheError::NotFound) when
/// the key does not exist in the source of truth.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
}

/// Adapts a synchronous closure into a [`Getter`].
///
/// The closure runs on the calling async task, so it must not block: use it
/// for in-memory lookups. Wrap blocking I/O in [`BlockingGetterFunc`].
pub struct GetterFunc<F>(pub F);

#[async_trait]
impl<F> Getter for GetterFunc<F>
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync,
{
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        (self.0)(key)
    }
}

/// Runs a blocking closure on tokio's blocking thread pool.
pub struct BlockingGetterFunc<F>(Arc<F>);

impl<F> BlockingGetterFunc<F>
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self(Arc::new(f))
    }
}

#[async_trait]
impl<F> Getter for BlockingGetterFunc<F>
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let f = self.0.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || f(&key))
            .await
            .map_err(|e| CacheError::Internal(format!("blocking loader failed: {}", e)))?
    }
}
