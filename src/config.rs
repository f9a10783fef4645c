//! Configuration Module
//!
//! Handles loading proxy configuration from command-line arguments and
//! environment variables.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

/// Default aggregate cache capacity in bytes
pub const DEFAULT_MAX_CACHE_SIZE: usize = 1_049_000;

/// Default per-object cacheability ceiling in bytes
pub const DEFAULT_MAX_OBJECT_SIZE: usize = 102_400;

/// Concurrent HTTP forward proxy with an LRU object cache
#[derive(Parser, Debug, Clone)]
#[command(name = "cache_proxy")]
#[command(about = "Concurrent HTTP forward proxy with an LRU object cache")]
pub struct Args {
    /// Port to listen on (all interfaces)
    pub port: u16,

    /// Aggregate cache capacity in bytes
    #[arg(long, env = "MAX_CACHE_SIZE", default_value_t = DEFAULT_MAX_CACHE_SIZE)]
    pub max_cache_size: usize,

    /// Responses of this many bytes or more are never cached
    #[arg(long, env = "MAX_OBJECT_SIZE", default_value_t = DEFAULT_MAX_OBJECT_SIZE)]
    pub max_object_size: usize,

    /// Serve /stats and /health on this port
    #[arg(long, env = "ADMIN_PORT")]
    pub admin_port: Option<u16>,

    /// Origin connect timeout in milliseconds (none by default)
    #[arg(long, env = "CONNECT_TIMEOUT_MS")]
    pub connect_timeout_ms: Option<u64>,

    /// Per read/write timeout in milliseconds (none by default)
    #[arg(long, env = "IO_TIMEOUT_MS")]
    pub io_timeout_ms: Option<u64>,

    /// Extra origin connect attempts after a failure
    #[arg(long, env = "CONNECT_RETRIES", default_value_t = 0)]
    pub connect_retries: u32,

    /// Log cache statistics every N seconds (0 disables)
    #[arg(long, env = "STATS_INTERVAL", default_value_t = 0)]
    pub stats_interval: u64,
}

/// Rejected configuration values.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_cache_size must be greater than zero")]
    ZeroCacheSize,
    #[error("max_object_size must be greater than zero")]
    ZeroObjectSize,
}

/// Proxy configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listening port
    pub port: u16,
    /// Aggregate cache capacity in bytes
    pub max_cache_size: usize,
    /// Per-object cacheability ceiling in bytes
    pub max_object_size: usize,
    /// Optional admin API port
    pub admin_port: Option<u16>,
    /// Optional origin connect timeout
    pub connect_timeout: Option<Duration>,
    /// Optional per-operation I/O timeout
    pub io_timeout: Option<Duration>,
    /// Extra origin connect attempts
    pub connect_retries: u32,
    /// Stats reporter interval in seconds, 0 = disabled
    pub stats_interval: u64,
}

impl Config {
    /// Builds a Config from parsed arguments.
    pub fn from_args(args: Args) -> Self {
        Self {
            port: args.port,
            max_cache_size: args.max_cache_size,
            max_object_size: args.max_object_size,
            admin_port: args.admin_port,
            connect_timeout: args.connect_timeout_ms.map(Duration::from_millis),
            io_timeout: args.io_timeout_ms.map(Duration::from_millis),
            connect_retries: args.connect_retries,
            stats_interval: args.stats_interval,
        }
    }

    /// Checks the cache bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cache_size == 0 {
            return Err(ConfigError::ZeroCacheSize);
        }
        if self.max_object_size == 0 {
            return Err(ConfigError::ZeroObjectSize);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            max_object_size: DEFAULT_MAX_OBJECT_SIZE,
            admin_port: None,
            connect_timeout: None,
            io_timeout: None,
            connect_retries: 0,
            stats_interval: 0,
        }
    }
}
