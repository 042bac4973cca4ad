//! Shared application state
//!
//! One cache instance is built at startup and handed to every connection
//! task and to the admin router by shared ownership.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::CacheStore;

/// State shared across all connection tasks.
///
/// Lookups take the read lock, so any number of them run in parallel;
/// stores take the write lock and run alone.
#[derive(Clone)]
pub struct AppState {
    /// Shared object cache
    pub cache: Arc<RwLock<CacheStore>>,
}

impl AppState {
    /// Creates a new AppState around the given cache store.
    pub fn new(cache: CacheStore) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }
}

impl Default for AppState {
    /// AppState around a cache with the production size limits.
    fn default() -> Self {
        Self::new(CacheStore::default())
    }
}
