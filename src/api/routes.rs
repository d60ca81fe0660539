//! API Routes
//!
//! Configures the Axum router with the diagnostics endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    breaker_handler, cache_stats_handler, health_handler, invalidate_handler,
    list_breakers_handler, reset_breakers_handler, AppState,
};

/// Creates the main router with all endpoints configured.
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
        .route("/health", get(health_handler))
        .route("/stats/cache", get(cache_stats_handler))
        .route("/cache", delete(invalidate_handler))
        .route("/breakers", get(list_breakers_handler))
        .route("/breakers/reset", post(reset_breakers_handler))
        .route("/breakers/:name", get(breaker_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
