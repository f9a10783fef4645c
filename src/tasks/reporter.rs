//! Stats Reporter Task
//!
//! Background task that periodically logs a snapshot of the cache counters.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::SharedCache;

/// Spawns a background task that logs cache statistics every
/// `interval_secs` seconds.
///
/// Each report takes the read guard only long enough to copy the counters.
/// The returned handle is aborted during shutdown.
///
/// # Example
/// ```ignore
/// let reporter = spawn_stats_reporter(state.cache.clone(), 60);
/// // Later, during shutdown:
/// reporter.abort();
/// ```
pub fn spawn_stats_reporter(cache: SharedCache, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting stats reporter with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let stats = cache.stats().await;
            info!(
                hits = stats.hits,
                misses = stats.misses,
                hit_rate = stats.hit_rate(),
                insertions = stats.insertions,
                evictions = stats.evictions,
                entries = stats.total_entries,
                bytes = stats.total_bytes,
                "Cache stats"
            );
        }
    })
}
