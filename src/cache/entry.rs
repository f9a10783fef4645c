//! Cache Entry Module
//!
//! Defines a cached response object and the handles used to reach it.

use bytes::Bytes;

// == Cache Entry ==
/// A cached origin response keyed by the literal request line.
///
/// The payload is immutable once inserted.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The request line, e.g. `GET http://example.com/ HTTP/1.1`
    pub key: String,
    /// Raw response bytes as received from the origin
    pub payload: Bytes,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    pub fn new(key: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
        }
    }

    // == Size ==
    /// Byte length of the payload.
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

// == Entry Handle ==
/// Position of an entry inside the store.
///
/// A handle outlives the entry it names: once that entry is evicted the
/// handle goes stale and every operation on it is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle {
    pub(crate) slot: usize,
    pub(crate) generation: u64,
}

// == Cache Hit ==
/// Result of a successful lookup.
///
/// `payload` shares the entry's bytes, so it stays valid after the read
/// guard is released even if the entry is evicted meanwhile.
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub handle: EntryHandle,
    pub payload: Bytes,
}

// == Insert Outcome ==
/// What an insert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Stored at the most-recently-used position
    Inserted { evicted: usize },
    /// A resident entry with the same key was replaced
    Replaced { evicted: usize },
    /// Larger than the whole store; nothing changed
    TooLarge,
}

impl InsertOutcome {
    /// Returns true if the payload is now resident.
    pub fn is_stored(&self) -> bool {
        !matches!(self, InsertOutcome::TooLarge)
    }

    /// Number of entries evicted to make room.
    pub fn evicted(&self) -> usize {
        match self {
            InsertOutcome::Inserted { evicted } | InsertOutcome::Replaced { evicted } => *evicted,
            InsertOutcome::TooLarge => 0,
        }
    }
}
