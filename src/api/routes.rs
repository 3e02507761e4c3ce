//! API Routes
//!
//! Configures the Axum router with all cache endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_all_handler, clear_expired_handler, delete_cache_handler, delete_metadata_handler,
    get_cache_handler, get_metadata_handler, get_settings_handler, health_handler,
    set_cache_handler, set_metadata_handler, stats_handler, update_settings_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET|PUT|DELETE /cache` - Navigation list cache by filter signature
/// - `POST /cache/clear` - Remove every cache record
/// - `POST /cache/clear-expired` - Remove expired and corrupted records
/// - `GET|PUT|DELETE /metadata` - Database metadata cache
/// - `GET /stats` - Cache inventory
/// - `GET|PUT /settings` - Cache preferences
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin so a browser dashboard can call the cache
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route(
            "/cache",
            get(get_cache_handler)
                .put(set_cache_handler)
                .delete(delete_cache_handler),
        )
        .route("/cache/clear", post(clear_all_handler))
        .route("/cache/clear-expired", post(clear_expired_handler))
        .route(
            "/metadata",
            get(get_metadata_handler)
                .put(set_metadata_handler)
                .delete(delete_metadata_handler),
        )
        .route("/stats", get(stats_handler))
        .route(
            "/settings",
            get(get_settings_handler).put(update_settings_handler),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
