//! API layer - routes, handlers, and middleware

pub mod handlers;
pub mod middleware;
pub mod routes;

use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_request_body_size;
    let cors_origins = state.config.server.cors_origins.clone();

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Root endpoint
        .route("/", get(root))
        // Favicon handler (returns 204 to prevent 404 logs)
        .route("/favicon.ico", get(favicon))
        // Discovery API routes
        .nest("/api", routes::discovery::discovery_routes())
        .with_state(state)
        // Middleware (applied in reverse order)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(middleware::compression())
        .layer(middleware::cors(&cors_origins))
        .layer(DefaultBodyLimit::max(max_body_size))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "treff-server"
    }))
}

async fn root() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "server": "Treff Discovery (Rust)",
            "version": env!("CARGO_PKG_VERSION"),
            "status": "running"
        })),
    )
}

async fn favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
