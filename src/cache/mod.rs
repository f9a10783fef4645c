//! Cache Module
//!
//! Provides the in-memory response cache: a byte-bounded LRU store and the
//! reader/writer lock that guards it.

mod entry;
mod guard;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, CacheHit, EntryHandle, InsertOutcome};
pub use guard::SharedCache;
pub use lru::LruList;
pub use stats::{CacheStats, StatsCounters};
pub use store::CacheStore;
