//! Peer Cache - A distributed in-process cache
//!
//! Each process keeps a byte-bounded LRU cache per group. Peers share a
//! consistent-hash ring so every key is loaded by one owner; the others
//! fetch it over HTTP, and concurrent misses for a key collapse into a
//! single load.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;

pub use api::{AppState, PeerState};
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{BlockingGetterFunc, Getter, GetterFunc, Group, GroupRegistry};
pub use peers::{PeerClient, PeerOptions, PeerRouter, PeerServer};
