//! API Routes
//!
//! Configures the Axum router for a cache node.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, peer_handler, stats_handler, AppState};

/// Creates the node router.
///
/// # Endpoints
/// - `GET {base_path}{group}/{key}` - Peer protocol, raw value bytes
/// - `GET /stats` - Per-group statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let peer_route = format!("{}*path", state.base_path);

    Router::new()
        .route(&peer_route, get(peer_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
