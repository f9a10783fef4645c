//! Cache Proxy - a concurrent HTTP forward proxy with an LRU object cache
//!
//! Serves repeated GET requests from memory and forwards everything else to
//! the origin server over a fresh HTTP/1.0 connection.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod proxy;
pub mod state;
pub mod tasks;

pub use config::{Args, Config};
pub use error::ProxyError;
pub use proxy::ProxyServer;
pub use state::AppState;
pub use tasks::spawn_stats_reporter;
