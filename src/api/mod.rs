//! Admin API Module
//!
//! Optional HTTP endpoint exposing cache statistics, served on its own port.
//!
//! # Endpoints
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_router, serve_admin};
