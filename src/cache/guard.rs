//! Shared Cache Module
//!
//! The single reader/writer lock every connection goes through to reach the
//! store. Any number of lookups run together; an insert or promote excludes
//! everything else.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::cache::{CacheHit, CacheStats, CacheStore, EntryHandle, InsertOutcome};

/// Clonable handle to the one process-wide [`CacheStore`].
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<RwLock<CacheStore>>,
}

impl SharedCache {
    /// Wraps a store for sharing across connections.
    pub fn new(store: CacheStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Creates an empty shared store with the given capacity.
    pub fn with_capacity(max_cache_size: usize) -> Self {
        Self::new(CacheStore::new(max_cache_size))
    }

    /// Acquires the read guard.
    pub async fn read(&self) -> RwLockReadGuard<'_, CacheStore> {
        self.inner.read().await
    }

    /// Acquires the write guard.
    pub async fn write(&self) -> RwLockWriteGuard<'_, CacheStore> {
        self.inner.write().await
    }

    /// Looks up a request line under the read guard.
    ///
    /// The guard is released on return; the hit's payload stays readable.
    pub async fn lookup(&self, key: &str) -> Option<CacheHit> {
        self.read().await.lookup(key)
    }

    /// Promotes an entry under the write guard.
    ///
    /// The read guard from the lookup has already been dropped by now, so
    /// another connection may have evicted the entry in between. That case
    /// returns false and is otherwise harmless.
    pub async fn promote(&self, handle: EntryHandle) -> bool {
        self.write().await.promote(handle)
    }

    /// Inserts a payload under the write guard.
    pub async fn insert(&self, key: String, payload: Bytes) -> InsertOutcome {
        self.write().await.insert(key, payload)
    }

    /// Snapshot of the store's statistics.
    pub async fn stats(&self) -> CacheStats {
        self.read().await.stats()
    }

    /// Aggregate capacity of the store in bytes.
    pub async fn max_cache_size(&self) -> usize {
        self.read().await.max_cache_size()
    }
}
