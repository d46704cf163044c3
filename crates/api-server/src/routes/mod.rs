//! Route handlers and the assembled HTTP application

pub mod health;
pub mod task;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

use crate::deadline::stamp_deadline;
use crate::error::ApiError;
use crate::state::AppState;

/// Build the full application: routes, JSON fallbacks, body limit,
/// per-request deadline, CORS and the access log.
pub fn app(state: AppState) -> Router {
    let max_body_bytes = state.config().max_body_bytes;

    Router::new()
        .merge(health::router())
        .merge(task::router())
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn_with_state(state.clone(), stamp_deadline))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // One span per request with method and path, one event per response
        // with status and latency.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tasks_core::task::MemoryTaskStore;
    use tower::ServiceExt;

    use crate::{config::Config, state::AppState};

    async fn call(method: &str, uri: &str) -> (StatusCode, Value) {
        let state = AppState::new(Arc::new(MemoryTaskStore::new()), Config::default());
        let response = super::app(state)
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, body) = call("GET", "/projects").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Route not found"}));
    }

    #[tokio::test]
    async fn wrong_method_is_json_405() {
        let (status, body) = call("PATCH", "/tasks/abc").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({"error": "Method not allowed"}));

        let (status, _) = call("DELETE", "/tasks").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
