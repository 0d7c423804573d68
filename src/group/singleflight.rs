//! Load Coalescing
//!
//! Collapses concurrent loads of the same key into a single execution.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

use crate::error::Result;

/// Outcome slot shared by the owner of a call and its waiters.
type Slot<T> = Option<Result<T>>;

// == Call Coalescer ==
/// Runs at most one load per key at a time.
///
/// The first caller for a key becomes the owner and runs the load; callers
/// arriving while it is in flight wait for the owner and receive a clone of
/// its result, success or error. The in-flight entry is removed as soon as
/// the owner finishes or is dropped, so the next miss starts a fresh load.
pub struct CallCoalescer<T> {
    calls: Mutex<HashMap<String, watch::Receiver<Slot<T>>>>,
}

enum Role<T> {
    Owner(watch::Sender<Slot<T>>),
    Waiter(watch::Receiver<Slot<T>>),
}

/// Removes the in-flight entry when the owner finishes or is dropped.
struct CallGuard<'a, T> {
    calls: &'a Mutex<HashMap<String, watch::Receiver<Slot<T>>>>,
    key: &'a str,
}

impl<T> Drop for CallGuard<'_, T> {
    fn drop(&mut self) {
        self.calls.lock().remove(self.key);
    }
}

impl<T: Clone> CallCoalescer<T> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    // == Work ==
    /// Runs `f` for `key` unless a run is already in flight, in which case
    /// the in-flight result is awaited and shared.
    ///
    /// If the owner is dropped before it finishes, one of its waiters takes
    /// over and runs its own `f`; the others keep waiting on the new owner.
    pub async fn work<F, Fut>(&self, key: &str, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        loop {
            let role = {
                let mut calls = self.calls.lock();
                match calls.get(key) {
                    Some(rx) => Role::Waiter(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        calls.insert(key.to_string(), rx);
                        Role::Owner(tx)
                    }
                }
            };

            match role {
                Role::Owner(tx) => {
                    let _guard = CallGuard {
                        calls: &self.calls,
                        key,
                    };
                    let result = f().await;
                    tx.send_replace(Some(result.clone()));
                    return result;
                }
                Role::Waiter(mut rx) => {
                    let outcome = match rx.wait_for(Option::is_some).await {
                        Ok(slot) => (*slot).clone(),
                        Err(_) => None,
                    };
                    match outcome {
                        Some(result) => return result,
                        None => debug!("in-flight load for {} was dropped, retrying", key),
                    }
                }
            }
        }
    }

    /// Number of keys with a load in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T: Clone> Default for CallCoalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}
