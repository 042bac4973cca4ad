//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache bounds, eviction order and the
//! shared-reader behavior over randomized operation sequences.

use proptest::prelude::*;

use crate::cache::CacheStore;
use crate::error::ProxyError;

// == Test Configuration ==
const TEST_CACHE_SIZE: usize = 1000;
const TEST_OBJECT_SIZE: usize = 100;
const KEY_SLOTS: usize = 6;

// == Strategies ==
/// Generates request targets in the raw form the proxy uses as keys
fn target_strategy() -> impl Strategy<Value = String> {
    "http://[a-z]{3,8}\\.example/[a-z0-9]{1,12}".prop_map(|s| s)
}

/// Generates response bodies within the per-object limit
fn body_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=TEST_OBJECT_SIZE)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Store { key: String, body: Vec<u8> },
    Lookup { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (target_strategy(), body_strategy())
            .prop_map(|(key, body)| CacheOp::Store { key, body }),
        target_strategy().prop_map(|key| CacheOp::Lookup { key }),
    ]
}

/// Key for one of the fixed slots the concurrency test cycles through
fn slot_key(slot: usize) -> String {
    format!("http://origin.example/object-{}", slot)
}

/// Deterministic body for a slot, so a torn read is detectable
fn slot_body(slot: usize) -> Vec<u8> {
    vec![b'a' + slot as u8; (slot + 1) * 10]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, the hit and miss counters equal the
    // number of lookups that returned a body and the number that did not.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(TEST_CACHE_SIZE, TEST_OBJECT_SIZE);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Store { key, body } => {
                    let _ = store.store(key, body);
                }
                CacheOp::Lookup { key } => {
                    match store.lookup(&key) {
                        Some(_) => expected_hits += 1,
                        None => expected_misses += 1,
                    }
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
    }

    // For any storable body, looking the key up right after storing it
    // returns the exact same bytes, with the counter at insert-plus-one-hit.
    #[test]
    fn prop_roundtrip_storage(key in target_strategy(), body in body_strategy()) {
        let mut store = CacheStore::new(TEST_CACHE_SIZE, TEST_OBJECT_SIZE);

        store.store(key.clone(), body.clone()).unwrap();

        let retrieved = store.lookup(&key);
        prop_assert_eq!(retrieved, Some(body), "Round-trip body mismatch");
        prop_assert_eq!(store.touch_count(&key), Some(2));
    }

    // For any key, storing body B1 and then body B2 under it leaves a single
    // entry holding B2.
    #[test]
    fn prop_overwrite_semantics(
        key in target_strategy(),
        body1 in body_strategy(),
        body2 in body_strategy()
    ) {
        let mut store = CacheStore::new(TEST_CACHE_SIZE, TEST_OBJECT_SIZE);

        store.store(key.clone(), body1).unwrap();
        store.store(key.clone(), body2.clone()).unwrap();

        prop_assert_eq!(store.lookup(&key), Some(body2), "Overwrite should return new body");
        prop_assert_eq!(store.len(), 1, "Should have exactly one entry after overwrite");
    }

    // For any sequence of storable bodies, the aggregate byte count never
    // exceeds the cache budget, and every in-limit store succeeds.
    #[test]
    fn prop_byte_budget_enforcement(
        entries in prop::collection::vec(
            (target_strategy(), body_strategy()),
            1..100
        )
    ) {
        let mut store = CacheStore::new(TEST_CACHE_SIZE, TEST_OBJECT_SIZE);

        for (key, body) in entries {
            prop_assert!(store.store(key, body).is_ok());
            prop_assert!(
                store.total_bytes() <= TEST_CACHE_SIZE,
                "Cache holds {} bytes, budget is {}",
                store.total_bytes(),
                TEST_CACHE_SIZE
            );
        }
    }

    // For any body above the per-object limit, the store call fails and
    // leaves the cache exactly as it was.
    #[test]
    fn prop_oversize_rejected_without_side_effects(
        seed_entries in prop::collection::vec(
            (target_strategy(), body_strategy()),
            0..10
        ),
        key in target_strategy(),
        oversize in (TEST_OBJECT_SIZE + 1)..(TEST_OBJECT_SIZE * 3)
    ) {
        let mut store = CacheStore::new(TEST_CACHE_SIZE, TEST_OBJECT_SIZE);
        for (seed_key, body) in seed_entries {
            store.store(seed_key, body).unwrap();
        }

        let len_before = store.len();
        let bytes_before = store.total_bytes();
        let evictions_before = store.stats().evictions;

        let result = store.store(key.clone(), vec![0u8; oversize]);

        prop_assert!(matches!(result, Err(ProxyError::ObjectTooLarge(_))));
        prop_assert_eq!(store.len(), len_before);
        prop_assert_eq!(store.total_bytes(), bytes_before);
        prop_assert_eq!(store.stats().evictions, evictions_before);
    }

    // Two stores that both fit leave the same aggregates in either order.
    #[test]
    fn prop_store_order_commutes_on_aggregates(
        key1 in target_strategy(),
        key2 in target_strategy(),
        body1 in body_strategy(),
        body2 in body_strategy()
    ) {
        prop_assume!(key1 != key2);

        let mut forward = CacheStore::new(TEST_CACHE_SIZE, TEST_OBJECT_SIZE);
        forward.store(key1.clone(), body1.clone()).unwrap();
        forward.store(key2.clone(), body2.clone()).unwrap();

        let mut reverse = CacheStore::new(TEST_CACHE_SIZE, TEST_OBJECT_SIZE);
        reverse.store(key2, body2).unwrap();
        reverse.store(key1, body1).unwrap();

        prop_assert_eq!(forward.total_bytes(), reverse.total_bytes());
        prop_assert_eq!(forward.len(), reverse.len());
    }

    // Whichever entry holds the uniquely lowest touch count is the one that
    // goes when the next store overflows the budget, wherever it sits.
    #[test]
    fn prop_lowest_touch_count_is_evicted(
        entry_count in 3usize..8,
        low_index in any::<prop::sample::Index>()
    ) {
        let low = low_index.index(entry_count);
        let mut store = CacheStore::new(entry_count * 10, 10);

        // Fill the budget exactly, then give every other entry a distinct
        // touch count above the chosen victim's initial 1.
        for i in 0..entry_count {
            store.store(format!("key-{}", i), vec![0u8; 10]).unwrap();
        }
        for i in 0..entry_count {
            if i != low {
                for _ in 0..=i {
                    store.lookup(&format!("key-{}", i));
                }
            }
        }

        store.store("fresh".to_string(), vec![0u8; 10]).unwrap();

        prop_assert_eq!(
            store.touch_count(&format!("key-{}", low)),
            None,
            "Entry {} had the lowest touch count and should be gone",
            low
        );
        for i in (0..entry_count).filter(|&i| i != low) {
            let key = format!("key-{}", i);
            prop_assert!(store.touch_count(&key).is_some());
        }
        prop_assert!(store.touch_count("fresh").is_some());
        prop_assert_eq!(store.stats().evictions, 1);
        prop_assert_eq!(store.total_bytes(), entry_count * 10);
    }
}

// == Property Test for Concurrent Operation Correctness ==
// This tests shared access to the cache via Arc<RwLock<CacheStore>>

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any mix of concurrent lookups and stores, every lookup returns
    // either nothing or the complete body written for that slot, never a
    // torn or partial copy.
    #[test]
    fn prop_concurrent_lookups_see_complete_bodies(
        operations in prop::collection::vec(
            prop_oneof![
                (0..KEY_SLOTS).prop_map(|slot| CacheOp::Store {
                    key: slot_key(slot),
                    body: slot_body(slot),
                }),
                (0..KEY_SLOTS).prop_map(|slot| CacheOp::Lookup { key: slot_key(slot) }),
            ],
            10..40
        )
    ) {
        use std::sync::Arc;
        use tokio::sync::RwLock;

        // Create a runtime for async operations
        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let store = Arc::new(RwLock::new(CacheStore::new(TEST_CACHE_SIZE, TEST_OBJECT_SIZE)));

            // Seed every slot so lookups can hit from the first task on
            {
                let mut cache = store.write().await;
                for slot in 0..KEY_SLOTS {
                    cache.store(slot_key(slot), slot_body(slot)).unwrap();
                }
            }

            // Spawn concurrent tasks
            let mut handles = vec![];

            for op in operations {
                let store_clone = Arc::clone(&store);

                let handle = tokio::spawn(async move {
                    match op {
                        CacheOp::Store { key, body } => {
                            let mut cache = store_clone.write().await;
                            cache.store(key, body).map_err(|e| e.to_string())?;
                            Ok::<_, String>(())
                        }
                        CacheOp::Lookup { key } => {
                            let cache = store_clone.read().await;
                            if let Some(body) = cache.lookup(&key) {
                                let slot = (body[0] - b'a') as usize;
                                if body != slot_body(slot) {
                                    return Err(format!(
                                        "torn read: {} bytes for key '{}'",
                                        body.len(),
                                        key
                                    ));
                                }
                            }
                            Ok(())
                        }
                    }
                });

                handles.push(handle);
            }

            // Wait for all tasks to complete and check for errors
            for handle in handles {
                let result = handle.await.expect("Task should not panic");
                prop_assert!(result.is_ok(), "Concurrent operation failed: {:?}", result);
            }

            // Verify cache is in a consistent state
            let cache = store.read().await;
            prop_assert!(
                cache.total_bytes() <= TEST_CACHE_SIZE,
                "Cache should stay within its byte budget"
            );

            let hit_rate = cache.stats().hit_rate();
            prop_assert!(
                (0.0..=1.0).contains(&hit_rate),
                "Hit rate should be between 0 and 1, got {}",
                hit_rate
            );

            Ok(())
        })?;
    }
}

// == Additional Unit Tests for Lock Behavior ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[tokio::test]
    async fn test_lookups_run_under_shared_read_guards() {
        let store = Arc::new(RwLock::new(CacheStore::new(TEST_CACHE_SIZE, TEST_OBJECT_SIZE)));
        store
            .write()
            .await
            .store("http://a.example/".to_string(), b"one".to_vec())
            .unwrap();

        let first = store.read().await;
        let second = store.read().await;

        // both guards are alive at once and both can serve hits
        assert_eq!(first.lookup("http://a.example/"), Some(b"one".to_vec()));
        assert_eq!(second.lookup("http://a.example/"), Some(b"one".to_vec()));
        assert!(store.try_write().is_err());

        drop(first);
        drop(second);
        assert!(store.try_write().is_ok());
    }

    #[tokio::test]
    async fn test_writer_holds_exclusive_access() {
        let store = Arc::new(RwLock::new(CacheStore::new(TEST_CACHE_SIZE, TEST_OBJECT_SIZE)));

        let mut guard = store.write().await;
        guard
            .store("http://a.example/".to_string(), b"one".to_vec())
            .unwrap();
        assert!(store.try_read().is_err());

        drop(guard);
        assert_eq!(
            store.read().await.lookup("http://a.example/"),
            Some(b"one".to_vec())
        );
    }

    #[tokio::test]
    async fn test_touch_counts_advance_under_shared_guards() {
        let store = Arc::new(RwLock::new(CacheStore::new(TEST_CACHE_SIZE, TEST_OBJECT_SIZE)));
        store
            .write()
            .await
            .store("http://a.example/".to_string(), b"one".to_vec())
            .unwrap();

        let guard = store.read().await;
        guard.lookup("http://a.example/");
        guard.lookup("http://a.example/");

        assert_eq!(guard.touch_count("http://a.example/"), Some(3));
        assert_eq!(guard.stats().hits, 2);
    }
}
