//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for the front API and the peer protocol.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use peer_cache::api::{create_peer_router, create_router};
use peer_cache::{
    AppState, CacheError, GetterFunc, GroupRegistry, PeerOptions, PeerServer, PeerState,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_registry(loads: Arc<AtomicUsize>) -> Arc<GroupRegistry> {
    let registry = Arc::new(GroupRegistry::new());
    registry
        .register(
            "scores",
            2 << 10,
            GetterFunc(move |key: &str| {
                loads.fetch_add(1, Ordering::SeqCst);
                match key {
                    "jw" => Ok(b"114".to_vec()),
                    "boyue" => Ok(b"514".to_vec()),
                    _ => Err(CacheError::NotFound(format!("{} not exist", key))),
                }
            }),
        )
        .unwrap();
    registry
}

fn create_test_app(registry: Arc<GroupRegistry>) -> Router {
    create_router(AppState::new(registry))
}

fn create_peer_app(registry: Arc<GroupRegistry>) -> Router {
    let server = PeerServer::new("http://localhost:8001", PeerOptions::default()).unwrap();
    create_peer_router(PeerState::new(Arc::new(server), registry))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

// == Front API Tests ==

#[tokio::test]
async fn test_api_get_loads_once() {
    let loads = Arc::new(AtomicUsize::new(0));
    let app = create_test_app(create_registry(loads.clone()));

    let (status, body) = get(app.clone(), "/api?group=scores&key=jw").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"114");
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    let (status, body) = get(app, "/api?group=scores&key=jw").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"114");
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_api_missing_key_not_found() {
    let loads = Arc::new(AtomicUsize::new(0));
    let registry = create_registry(loads.clone());
    let app = create_test_app(registry.clone());

    let (status, body) = get(app, "/api?group=scores&key=missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("missing"));

    let stats = registry.lookup("scores").unwrap().stats();
    assert_eq!(stats.total_entries, 0);
}

#[tokio::test]
async fn test_stats_endpoint() {
    let loads = Arc::new(AtomicUsize::new(0));
    let app = create_test_app(create_registry(loads));

    get(app.clone(), "/api?group=scores&key=jw").await;
    get(app.clone(), "/api?group=scores&key=jw").await;

    let (status, body) = get(app, "/stats/scores").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["group"], "scores");
    assert_eq!(json["gets"], 2);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["local_loads"], 1);
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(create_registry(Arc::new(AtomicUsize::new(0))));

    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["groups"][0], "scores");
}

// == Peer Protocol Tests ==

#[tokio::test]
async fn test_peer_round_trip() {
    let loads = Arc::new(AtomicUsize::new(0));
    let app = create_peer_app(create_registry(loads.clone()));

    let (status, body) = get(app.clone(), "/_cache/scores/boyue").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"514");

    let (status, _) = get(app.clone(), "/_cache/scores/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(app.clone(), "/_cache/nosuchgroup/jw").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(app, "/_cache/scores").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_peer_escaped_key() {
    let registry = Arc::new(GroupRegistry::new());
    registry
        .register(
            "files",
            0,
            GetterFunc(|key: &str| Ok(key.as_bytes().to_vec())),
        )
        .unwrap();
    let app = create_peer_app(registry);

    let (status, body) = get(app, "/_cache/files/dir%2Fname%20with%20space").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"dir/name with space");
}
