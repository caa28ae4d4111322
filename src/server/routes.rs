//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Largest accepted request body (nameplate photos).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // OCR
        .route("/extract", post(handlers::extract))
        // Search
        .route("/search", post(handlers::search))
        .route("/search-stream-fixed", post(handlers::search_stream))
        // Debug and inspection
        .route("/test-tm/:tm_number", get(handlers::test_tm))
        .route("/list-mappings", get(handlers::list_mappings))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
