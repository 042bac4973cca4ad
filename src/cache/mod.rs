//! Cache Module
//!
//! Shared in-memory response cache with a byte-bounded capacity and
//! least-frequently-used eviction driven by per-entry touch counters.

mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::CacheStore;

// == Public Constants ==
/// Maximum total bytes the cache may hold across all entries
pub const MAX_CACHE_SIZE: usize = 1_049_000;

/// Maximum size in bytes of a single cacheable response
pub const MAX_OBJECT_SIZE: usize = 102_400;
