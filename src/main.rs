//! Peer Cache - A distributed in-process cache
//!
//! Runs one cache node: a peer protocol server on the node's own address and,
//! optionally, the front API.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peer_cache::api::{create_peer_router, create_router, AppState, PeerState};
use peer_cache::{CacheError, Config, GetterFunc, GroupRegistry, PeerServer};

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the demo group and the peer set
/// 4. Start the peer server and, if enabled, the front API
/// 5. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peer_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Peer Cache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: self={}, peers={:?}, max_bytes={}, replicas={}, peer_timeout={}ms",
        config.self_addr, config.peers, config.max_bytes, config.replicas, config.peer_timeout_ms
    );

    let registry = Arc::new(GroupRegistry::new());
    let group = registry.register("scores", config.max_bytes, demo_getter())?;
    group.set_local_fallback(config.peer_fallback);

    let peers = Arc::new(PeerServer::new(config.self_addr.clone(), config.peer_options())?);
    peers.set(&config.peers);
    group.register_peers(peers.clone())?;

    let api_handle = if config.api_enabled {
        Some(spawn_api_server(&config, registry.clone()).await?)
    } else {
        None
    };

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind peer server on {}", addr))?;
    info!("Cache is running at {} (listening on {})", config.self_addr, addr);

    let app = create_peer_router(PeerState::new(peers, registry));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(api_handle))
        .await
        .context("peer server failed")?;

    info!("Server shutdown complete");
    Ok(())
}

/// In-memory stand-in for a slow database.
fn demo_getter() -> GetterFunc<impl Fn(&str) -> peer_cache::Result<Vec<u8>> + Send + Sync> {
    let db: HashMap<&'static str, &'static str> =
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]);

    GetterFunc(move |key: &str| {
        info!("[SlowDB] search key {}", key);
        db.get(key)
            .map(|v| v.as_bytes().to_vec())
            .ok_or_else(|| CacheError::NotFound(format!("{} not exist", key)))
    })
}

async fn spawn_api_server(
    config: &Config,
    registry: Arc<GroupRegistry>,
) -> anyhow::Result<JoinHandle<()>> {
    let addr = config.api_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind API server on {}", addr))?;
    info!("Front API server is running at http://{}", addr);

    let app = create_router(AppState::new(registry));
    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!("API server stopped: {}", e);
        }
    }))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the API server task and allows graceful shutdown.
async fn shutdown_signal(api_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = api_handle {
        handle.abort();
        warn!("API server aborted");
    }
}
