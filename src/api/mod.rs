//! API Module
//!
//! HTTP handlers and routing.
//!
//! # Front API
//! - `GET /api?group=<group>&key=<key>` - Read a value through the cache
//! - `GET /stats/:group` - Group statistics
//! - `GET /health` - Health check endpoint
//!
//! # Peer protocol
//! - `GET <base_path><group>/<key>` - Raw value for a peer

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_peer_router, create_router};
