//! Cache Store Module
//!
//! Cache engine combining HashMap storage with byte-budget accounting and
//! lowest-touch-count eviction.

use std::collections::HashMap;

use crate::cache::{CacheEntry, CacheStats, StatsSnapshot, MAX_CACHE_SIZE, MAX_OBJECT_SIZE};
use crate::error::{ProxyError, Result};

// == Cache Store ==
/// Byte-bounded response cache keyed by the literal request target.
///
/// Outside a `store` call in progress, `total_bytes` equals the sum of all
/// entry lengths and never exceeds the configured cache size.
#[derive(Debug)]
pub struct CacheStore {
    /// Request target to cached response
    entries: HashMap<String, CacheEntry>,
    /// Sum of all entry lengths
    total_bytes: usize,
    /// Performance statistics
    stats: CacheStats,
    /// Budget for the sum of all entry lengths
    max_cache_size: usize,
    /// Largest response a single entry may hold
    max_object_size: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given capacity bounds.
    ///
    /// # Arguments
    /// * `max_cache_size` - budget in bytes for all entries together
    /// * `max_object_size` - largest single response that may be stored
    pub fn new(max_cache_size: usize, max_object_size: usize) -> Self {
        debug_assert!(max_object_size <= max_cache_size);
        Self {
            entries: HashMap::new(),
            total_bytes: 0,
            stats: CacheStats::new(),
            max_cache_size,
            max_object_size,
        }
    }

    // == Lookup ==
    /// Returns a copy of the cached response for `key`, if present.
    ///
    /// The key must match the stored request target exactly; no
    /// normalization is applied. A hit bumps the entry's touch counter.
    ///
    /// Takes `&self` so lookups can run concurrently under a shared read
    /// lock; the counters involved are atomics.
    pub fn lookup(&self, key: &str) -> Option<Vec<u8>> {
        match self.entries.get(key) {
            Some(entry) => {
                entry.touch();
                self.stats.record_hit();
                Some(entry.body().to_vec())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Store ==
    /// Inserts a response under `key`, evicting as needed to stay within
    /// the byte budget.
    ///
    /// Responses larger than the per-object limit are rejected before any
    /// state is touched. Eviction removes the entry with the lowest touch
    /// count (ties arbitrary) until the new response fits. Storing an
    /// already-present key replaces the previous response.
    pub fn store(&mut self, key: String, body: Vec<u8>) -> Result<()> {
        if body.len() > self.max_object_size {
            return Err(ProxyError::ObjectTooLarge(body.len()));
        }

        if let Some(previous) = self.entries.remove(&key) {
            self.total_bytes -= previous.len();
        }

        self.make_room(body.len());

        self.total_bytes += body.len();
        self.entries.insert(key, CacheEntry::new(body));

        Ok(())
    }

    // == Make Room ==
    /// Evicts lowest-touch entries until `incoming` more bytes fit.
    fn make_room(&mut self, incoming: usize) {
        while self.total_bytes + incoming > self.max_cache_size {
            let victim = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.touch_count())
                .map(|(key, _)| key.clone());

            match victim {
                Some(key) => {
                    if let Some(entry) = self.entries.remove(&key) {
                        self.total_bytes -= entry.len();
                        self.stats.record_eviction();
                    }
                }
                None => break,
            }
        }
    }

    // == Touch Count ==
    /// Current touch count for `key`, if present.
    pub fn touch_count(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(|entry| entry.touch_count())
    }

    // == Stats ==
    /// Returns a snapshot of the performance counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    // == Aggregates ==
    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry lengths in bytes.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }
}

impl Default for CacheStore {
    /// A CacheStore with the production size limits.
    fn default() -> Self {
        Self::new(MAX_CACHE_SIZE, MAX_OBJECT_SIZE)
    }
}
