//! API Handlers
//!
//! HTTP request handlers for the front API and the peer protocol.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::cache::ByteView;
use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::models::{ApiQuery, HealthResponse, StatsResponse};
use crate::peers::PeerServer;

/// Content type of every cached value on the wire.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// State shared by the front API handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups served by this process
    pub registry: Arc<GroupRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<GroupRegistry>) -> Self {
        Self { registry }
    }
}

/// State of the peer protocol endpoint.
#[derive(Clone)]
pub struct PeerState {
    /// Own peer pool, provides the base path
    pub server: Arc<PeerServer>,
    /// Groups answerable to peers
    pub registry: Arc<GroupRegistry>,
}

impl PeerState {
    pub fn new(server: Arc<PeerServer>, registry: Arc<GroupRegistry>) -> Self {
        Self { server, registry }
    }
}

fn octet_stream(view: ByteView) -> Response {
    ([(header::CONTENT_TYPE, OCTET_STREAM)], view.to_bytes()).into_response()
}

fn lookup_group(registry: &GroupRegistry, name: &str) -> Result<Arc<crate::group::Group>> {
    registry
        .lookup(name)
        .ok_or_else(|| CacheError::NotFound(format!("no such group: {}", name)))
}

/// Handler for GET /api?group=<group>&key=<key>
///
/// Returns the raw cached bytes.
pub async fn api_handler(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
) -> Result<Response> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let group = lookup_group(&state.registry, &query.group)?;
    let view = group.get(&query.key).await?;
    Ok(octet_stream(view))
}

/// Handler for GET /stats/:group
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StatsResponse>> {
    let group = lookup_group(&state.registry, &name)?;
    Ok(Json(StatsResponse::new(name, group.stats())))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.registry.names()))
}

/// Handler for every request on the peer listener.
///
/// Expects `<base_path><group>/<key>`, each segment percent-encoded.
pub async fn peer_handler(
    State(state): State<PeerState>,
    method: Method,
    uri: Uri,
) -> Result<Response> {
    let path = uri.path();
    let rest = path.strip_prefix(state.server.base_path()).ok_or_else(|| {
        CacheError::NotFound(format!("unexpected path: {}", path))
    })?;
    info!("[Server {}] {} {}", state.server.self_addr(), method, path);

    let (group_name, key) = split_peer_path(rest)?;
    let group = lookup_group(&state.registry, &group_name)?;
    let view = group.get(&key).await?;

    Ok(octet_stream(view))
}

/// Splits `<group>/<key>` at the first `/` and percent-decodes both parts.
///
/// The key may itself contain `/`.
pub fn split_peer_path(rest: &str) -> Result<(String, String)> {
    let (group, key) = rest
        .split_once('/')
        .ok_or_else(|| CacheError::InvalidRequest("bad request".to_string()))?;

    let decode = |segment: &str| {
        urlencoding::decode(segment)
            .map(|s| s.into_owned())
            .map_err(|_| CacheError::InvalidRequest(format!("invalid encoding: {}", segment)))
    };

    Ok((decode(group)?, decode(key)?))
}
