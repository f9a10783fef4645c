//! Proxy Module
//!
//! The listener that accepts client connections and the per-connection
//! worker that serves each one from the cache or the origin.

mod buffer;
mod origin;
mod server;
mod worker;

use std::time::Duration;

pub use buffer::{Admission, ResponseBuffer};
pub use origin::{connect, timed};
pub use server::ProxyServer;
pub use worker::{handle_connection, serve, Served};

use crate::config::{Config, DEFAULT_MAX_OBJECT_SIZE};

/// Per-connection knobs shared by every worker.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    /// Responses of this many bytes or more are not cached
    pub max_object_size: usize,
    /// Origin connect timeout, none by default
    pub connect_timeout: Option<Duration>,
    /// Per read/write timeout, none by default
    pub io_timeout: Option<Duration>,
    /// Extra origin connect attempts
    pub connect_retries: u32,
}

impl ProxySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_object_size: config.max_object_size,
            connect_timeout: config.connect_timeout,
            io_timeout: config.io_timeout,
            connect_retries: config.connect_retries,
        }
    }
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            max_object_size: DEFAULT_MAX_OBJECT_SIZE,
            connect_timeout: None,
            io_timeout: None,
            connect_retries: 0,
        }
    }
}
