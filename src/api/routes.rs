//! API Routes
//!
//! Assembles the axum router for the host service.

use axum::{
    http::Method,
    routing::{delete, get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, get_handler, health_handler, set_handler, stats_handler, AppState,
};

/// Builds the router serving one [`AppState`].
///
/// Key operations live under `/set`, `/get/:key` and `/del/:key`;
/// `/stats` and `/health` report on the process. Every route is traced
/// and open to cross-origin callers for the methods it serves.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(key_routes())
        .merge(report_routes())
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn key_routes() -> Router<AppState> {
    Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/del/:key", delete(delete_handler))
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CachedStore, StoreOptions};
    use crate::remote::MemoryRemote;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn app() -> Router {
        let remote = Arc::new(MemoryRemote::new());
        let store = CachedStore::new(remote, StoreOptions::with_capacity(8)).unwrap();
        create_router(AppState::new(store))
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_report_routes_answer_get() {
        for uri in ["/stats", "/health"] {
            let response = app().oneshot(request(Method::GET, uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
        }
    }

    #[tokio::test]
    async fn test_wrong_method_is_rejected() {
        let response = app().oneshot(request(Method::POST, "/set")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = app()
            .oneshot(request(Method::PUT, "/get/k"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_route_has_empty_body() {
        let response = app()
            .oneshot(request(Method::GET, "/keys"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_cors_preflight_lists_methods() {
        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/set")
            .header(header::ORIGIN, "http://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(preflight).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let allowed = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(allowed.contains("PUT"));
        assert!(allowed.contains("DELETE"));
    }
}
