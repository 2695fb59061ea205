//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a simple reference model of an
//! LRU cache, plus counter and concurrency properties of the async handle.

use proptest::prelude::*;
use std::time::Duration;

use crate::cache::{CacheStore, MemoryCache};
use crate::config::CacheConfig;

// == Strategies ==
/// Keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-f]".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn config(max_size: usize, enable_metrics: bool) -> CacheConfig {
    CacheConfig {
        max_size,
        enable_metrics,
        cleanup_interval: Duration::ZERO,
        ..CacheConfig::default()
    }
}

// == Reference Model ==
/// Ordered most recently used first.
#[derive(Debug, Default)]
struct Model {
    order: Vec<(String, String)>,
    max_size: usize,
    hits: u64,
    misses: u64,
    sets: u64,
    deletes: u64,
    evictions: u64,
}

impl Model {
    fn new(max_size: usize) -> Self {
        Self {
            max_size,
            ..Self::default()
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.order.iter().position(|(k, _)| k == key)
    }

    fn set(&mut self, key: String, value: String) {
        match self.position(&key) {
            Some(pos) => {
                self.order.remove(pos);
            }
            None if self.max_size > 0 && self.order.len() >= self.max_size => {
                self.order.pop();
                self.evictions += 1;
            }
            None => {}
        }
        self.order.insert(0, (key, value));
        self.sets += 1;
    }

    fn get(&mut self, key: &str) -> Option<String> {
        match self.position(key) {
            Some(pos) => {
                let entry = self.order.remove(pos);
                let value = entry.1.clone();
                self.order.insert(0, entry);
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn delete(&mut self, key: &str) {
        if let Some(pos) = self.position(key) {
            self.order.remove(pos);
            self.deletes += 1;
        }
    }

    fn keys(&self) -> Vec<String> {
        self.order.iter().map(|(k, _)| k.clone()).collect()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The store behaves exactly like the reference LRU model: same values,
    // same recency order, same counters.
    #[test]
    fn prop_matches_lru_model(
        max_size in 0usize..5,
        ops in prop::collection::vec(cache_op_strategy(), 1..80),
    ) {
        let mut store: CacheStore<String> = CacheStore::new(config(max_size, true));
        let mut model = Model::new(max_size);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.clone(), value.clone(), None);
                    model.set(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key), model.get(&key));
                }
                CacheOp::Delete { key } => {
                    store.delete(&key);
                    model.delete(&key);
                }
            }
            prop_assert_eq!(store.keys(), model.keys());
        }

        let metrics = store.metrics();
        prop_assert_eq!(metrics.hits, model.hits);
        prop_assert_eq!(metrics.misses, model.misses);
        prop_assert_eq!(metrics.sets, model.sets);
        prop_assert_eq!(metrics.deletes, model.deletes);
        prop_assert_eq!(metrics.evictions, model.evictions);
        prop_assert_eq!(metrics.size, store.len());
    }

    // A bounded cache never holds more than max_size entries.
    #[test]
    fn prop_capacity_enforced(
        max_size in 1usize..10,
        keys in prop::collection::vec("[a-z]{1,4}", 1..100),
    ) {
        let mut store: CacheStore<String> = CacheStore::new(config(max_size, true));

        for key in keys {
            store.set(key, "v".to_string(), None);
            prop_assert!(store.len() <= max_size);
        }
    }

    // hit_rate is always hits / (hits + misses), and zero before any read.
    #[test]
    fn prop_hit_rate_derivation(ops in prop::collection::vec(cache_op_strategy(), 0..60)) {
        let mut store: CacheStore<String> = CacheStore::new(config(0, true));

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, None),
                CacheOp::Get { key } => {
                    store.get(&key);
                }
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
        }

        let metrics = store.metrics();
        let reads = metrics.hits + metrics.misses;
        if reads == 0 {
            prop_assert_eq!(metrics.hit_rate, 0.0);
        } else {
            let expected = metrics.hits as f64 / reads as f64;
            prop_assert!((metrics.hit_rate - expected).abs() < 1e-9);
        }
        prop_assert!((0.0..=1.0).contains(&metrics.hit_rate));
    }

    // With metrics disabled the counters stay at zero, but size still tracks.
    #[test]
    fn prop_disabled_metrics_stay_zero(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store: CacheStore<String> = CacheStore::new(config(3, false));

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, None),
                CacheOp::Get { key } => {
                    store.get(&key);
                }
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
            }
        }

        let metrics = store.metrics();
        prop_assert_eq!(metrics.hits, 0);
        prop_assert_eq!(metrics.misses, 0);
        prop_assert_eq!(metrics.sets, 0);
        prop_assert_eq!(metrics.deletes, 0);
        prop_assert_eq!(metrics.evictions, 0);
        prop_assert_eq!(metrics.size, store.len());
    }

    // Deleting twice removes once.
    #[test]
    fn prop_delete_idempotent(key in key_strategy(), value in value_strategy()) {
        let mut store: CacheStore<String> = CacheStore::new(config(10, true));
        store.set(key.clone(), value, None);

        prop_assert!(store.delete(&key));
        prop_assert!(!store.delete(&key));
        prop_assert_eq!(store.metrics().deletes, 1);
        prop_assert!(store.get(&key).is_none());
    }

    // Concurrent writers on distinct keys through the async handle lose no
    // updates and keep the counters consistent.
    #[test]
    fn prop_concurrent_sets_are_all_visible(writers in 1usize..8, per_writer in 1usize..20) {
        let (size, sets) = tokio_test::block_on(async {
            let cache: MemoryCache<usize> = MemoryCache::new("prop", config(0, true));

            let mut handles = Vec::new();
            for w in 0..writers {
                let cache = cache.clone();
                handles.push(tokio::spawn(async move {
                    for i in 0..per_writer {
                        cache.set(format!("{}-{}", w, i), i, None).await;
                    }
                }));
            }
            for handle in handles {
                handle.await.unwrap();
            }

            let metrics = cache.metrics().await;
            cache.close().await;
            (metrics.size, metrics.sets)
        });

        prop_assert_eq!(size, writers * per_writer);
        prop_assert_eq!(sets, (writers * per_writer) as u64);
    }
}
