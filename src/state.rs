//! Shared application state
//!
//! One instance is built at startup and cloned into the listener, every
//! connection worker and the admin API. Clones share the same cache.

use std::sync::Arc;

use crate::cache::{CacheStore, SharedCache};
use crate::config::Config;
use crate::proxy::ProxySettings;

/// Application state shared across all connections.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: SharedCache,
    /// Worker settings
    pub settings: Arc<ProxySettings>,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: CacheStore, settings: ProxySettings) -> Self {
        Self {
            cache: SharedCache::new(cache),
            settings: Arc::new(settings),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        let cache = CacheStore::new(config.max_cache_size);
        Self::new(cache, ProxySettings::from_config(config))
    }
}
