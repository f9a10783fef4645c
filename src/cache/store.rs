//! Cache Store Module
//!
//! Byte-bounded object store combining a key index with an LRU list.
//!
//! The store holds no lock of its own. Callers reach it through
//! [`SharedCache`](crate::cache::SharedCache), taking the read guard for
//! [`CacheStore::lookup`] and the write guard for everything that mutates.

use std::collections::HashMap;

use bytes::Bytes;

use crate::cache::{
    CacheEntry, CacheHit, CacheStats, EntryHandle, InsertOutcome, LruList, StatsCounters,
};

// == Cache Store ==
/// Recency-ordered object store bounded by total payload bytes.
#[derive(Debug)]
pub struct CacheStore {
    /// Request line to list position
    index: HashMap<String, EntryHandle>,
    /// Entries, most recently used first
    lru: LruList,
    /// Sum of resident payload sizes
    total_size: usize,
    /// Aggregate capacity in bytes
    max_cache_size: usize,
    /// Performance statistics
    stats: StatsCounters,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store holding at most `max_cache_size` payload bytes.
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            index: HashMap::new(),
            lru: LruList::new(),
            total_size: 0,
            max_cache_size,
            stats: StatsCounters::new(),
        }
    }

    // == Lookup ==
    /// Finds the entry for a request line.
    ///
    /// Does not change recency order; pass the returned handle to
    /// [`CacheStore::promote`] for that.
    pub fn lookup(&self, key: &str) -> Option<CacheHit> {
        let hit = self.index.get(key).and_then(|&handle| {
            self.lru.get(handle).map(|entry| CacheHit {
                handle,
                payload: entry.payload.clone(),
            })
        });

        match hit {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        hit
    }

    // == Insert ==
    /// Stores a payload at the most-recently-used position.
    ///
    /// Least recently used entries are evicted one at a time until the new
    /// payload fits. A payload larger than the whole store is refused up
    /// front and leaves the store untouched. Re-inserting a resident key
    /// replaces it.
    pub fn insert(&mut self, key: String, payload: Bytes) -> InsertOutcome {
        let size = payload.len();
        if size > self.max_cache_size {
            self.stats.record_too_large();
            return InsertOutcome::TooLarge;
        }

        let replaced = match self.index.remove(&key) {
            Some(old) => {
                if let Some(entry) = self.lru.remove(old) {
                    self.total_size -= entry.size();
                }
                true
            }
            None => false,
        };

        let mut evicted = 0;
        while self.total_size + size > self.max_cache_size {
            let Some(victim) = self.lru.pop_back() else {
                break;
            };
            self.total_size -= victim.size();
            self.index.remove(&victim.key);
            self.stats.record_eviction();
            evicted += 1;
        }

        let handle = self.lru.push_front(CacheEntry::new(key.clone(), payload));
        self.index.insert(key, handle);
        self.total_size += size;
        self.stats.record_insertion();

        if replaced {
            InsertOutcome::Replaced { evicted }
        } else {
            InsertOutcome::Inserted { evicted }
        }
    }

    // == Promote ==
    /// Moves an entry to the most-recently-used position.
    ///
    /// Returns false, and changes nothing, if the entry was evicted after the
    /// handle was obtained.
    pub fn promote(&mut self, handle: EntryHandle) -> bool {
        self.lru.move_to_front(handle)
    }

    // == Contains ==
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Keys By Recency ==
    /// Resident keys, most recently used first.
    pub fn keys_by_recency(&self) -> Vec<&str> {
        self.lru.iter().map(|entry| entry.key.as_str()).collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.lru.len(), self.total_size)
    }

    // == Sizes ==
    /// Sum of resident payload sizes in bytes.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn max_cache_size(&self) -> usize {
        self.max_cache_size
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.lru.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }

    /// Recomputes the byte total from the resident entries.
    #[cfg(test)]
    pub(crate) fn recount(&self) -> usize {
        self.lru.iter().map(CacheEntry::size).sum()
    }
}
