//! Cache Entry Module
//!
//! A single cached response body and its eviction bookkeeping.

use std::sync::atomic::{AtomicU64, Ordering};

// == Cache Entry ==
/// One cached response, immutable after insertion.
///
/// The touch counter is the eviction priority signal: it starts at 1 when
/// the entry is inserted and grows by one per successful lookup. It is
/// atomic so that hits under the shared read lock can record themselves
/// without exclusive access.
#[derive(Debug)]
pub struct CacheEntry {
    /// The cached response bytes
    body: Vec<u8>,
    /// Number of times this entry was inserted or looked up
    touches: AtomicU64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry with its touch counter at 1.
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            touches: AtomicU64::new(1),
        }
    }

    // == Body Access ==
    /// The cached bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Size of the cached bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the cached response is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    // == Touch Counter ==
    /// Records a lookup hit and returns the new touch count.
    pub fn touch(&self) -> u64 {
        self.touches.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Current touch count.
    pub fn touch_count(&self) -> u64 {
        self.touches.load(Ordering::Relaxed)
    }
}
