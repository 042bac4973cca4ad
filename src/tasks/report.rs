//! Cache Report Task
//!
//! Background task that periodically logs a summary of cache activity.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that logs cache statistics at a fixed interval.
///
/// The task runs in an infinite loop, sleeping between reports. Taking a
/// report needs only a read lock, so lookups keep running alongside it.
/// Reports log at info level when lookups happened since the last tick and
/// at debug level otherwise.
///
/// # Arguments
/// * `cache` - shared reference to the cache
/// * `interval_secs` - seconds between reports
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_report_task(cache: Arc<RwLock<CacheStore>>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting cache report task with interval of {} seconds",
            interval_secs
        );

        let mut last_lookups = 0u64;
        loop {
            tokio::time::sleep(interval).await;

            let (snapshot, entries, total_bytes) = {
                let cache = cache.read().await;
                (cache.stats(), cache.len(), cache.total_bytes())
            };

            let lookups = snapshot.hits + snapshot.misses;
            if lookups > last_lookups {
                info!(
                    hits = snapshot.hits,
                    misses = snapshot.misses,
                    evictions = snapshot.evictions,
                    entries,
                    total_bytes,
                    "cache report"
                );
            } else {
                debug!(entries, total_bytes, "cache report: no new lookups");
            }
            last_lookups = lookups;
        }
    })
}
