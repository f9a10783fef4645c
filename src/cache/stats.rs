//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that found an entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Objects admitted into the store
    pub insertions: u64,
    /// Entries evicted by the LRU policy
    pub evictions: u64,
    /// Inserts refused because the object exceeded the whole store
    pub too_large: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Current sum of resident payload sizes
    pub total_bytes: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Counters ==
/// Live counters owned by the store.
///
/// Hits and misses are atomic because lookups only hold the read guard.
#[derive(Debug, Default)]
pub struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: u64,
    evictions: u64,
    too_large: u64,
}

impl StatsCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_too_large(&mut self) {
        self.too_large += 1;
    }

    /// Builds a snapshot with the given occupancy figures.
    pub fn snapshot(&self, total_entries: usize, total_bytes: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            insertions: self.insertions,
            evictions: self.evictions,
            too_large: self.too_large,
            total_entries,
            total_bytes,
        }
    }
}
