//! API Routes
//!
//! Configures the Axum router with the peer protocol and node endpoints.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{api_handler, health_handler, peer_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET <base_path><group>/<key>` - Peer protocol, raw bytes
/// - `GET /api/:group/:key` - Front-end lookup, JSON
/// - `GET /stats` - Group statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let peer_route = format!("{}*rest", state.base_path);

    Router::new()
        .route(&peer_route, get(peer_handler))
        .route("/api/:group/:key", get(api_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
