//! API Routes
//!
//! Configures the Axum routers for the front API and the peer protocol.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    api_handler, health_handler, peer_handler, stats_handler, AppState, PeerState,
};

/// Creates the front API router.
///
/// # Endpoints
/// - `GET /api?group=<group>&key=<key>` - Raw cached bytes
/// - `GET /stats/:group` - Group statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(api_handler))
        .route("/stats/:group", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Creates the peer protocol router.
///
/// Every path goes to [`peer_handler`], which checks the base path itself so
/// that keys containing `/` are preserved.
pub fn create_peer_router(state: PeerState) -> Router {
    Router::new()
        .fallback(peer_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::group::{GetterFunc, GroupRegistry};
    use crate::peers::{PeerOptions, PeerServer};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn registry() -> Arc<GroupRegistry> {
        let registry = Arc::new(GroupRegistry::new());
        registry
            .register(
                "g",
                1024,
                GetterFunc(|key: &str| match key {
                    "k" => Ok(vec![1, 2, 3]),
                    "broken" => Err(CacheError::Loader("db down".to_string())),
                    _ => Err(CacheError::NotFound(key.to_string())),
                }),
            )
            .unwrap();
        registry
    }

    fn create_test_app() -> Router {
        create_router(AppState::new(registry()))
    }

    fn create_test_peer_app() -> Router {
        let server = PeerServer::new("http://localhost:8001", PeerOptions::default()).unwrap();
        create_peer_router(PeerState::new(Arc::new(server), registry()))
    }

    async fn get_status(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, _) = get_status(create_test_app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_endpoint() {
        let (status, body) = get_status(create_test_app(), "/api?group=g&key=k").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_api_missing_group_param() {
        let (status, _) = get_status(create_test_app(), "/api?key=k").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stats_unknown_group() {
        let (status, _) = get_status(create_test_app(), "/stats/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_peer_get_returns_raw_bytes() {
        let response = create_test_peer_app()
            .oneshot(
                Request::builder()
                    .uri("/_cache/g/k")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "application/octet-stream"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_peer_status_codes() {
        let cases = [
            ("/_cache/g/unknown-key", StatusCode::NOT_FOUND),
            ("/_cache/g/broken", StatusCode::INTERNAL_SERVER_ERROR),
            ("/_cache/bad", StatusCode::BAD_REQUEST),
            ("/_cache/bad/path/extra", StatusCode::NOT_FOUND),
            ("/elsewhere/g/k", StatusCode::NOT_FOUND),
        ];

        for (uri, expected) in cases {
            let (status, _) = get_status(create_test_peer_app(), uri).await;
            assert_eq!(status, expected, "GET {}", uri);
        }
    }
}
