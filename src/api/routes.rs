//! Admin API Routes
//!
//! Configures the Axum router for the admin endpoints.

use std::io;
use std::net::SocketAddr;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::{health_handler, stats_handler};
use crate::state::AppState;

/// Creates the admin router.
///
/// # Endpoints
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the admin router on `addr` until the task is aborted.
pub async fn serve_admin(addr: SocketAddr, state: AppState) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Admin API listening on http://{}", addr);
    axum::serve(listener, create_router(state)).await
}
