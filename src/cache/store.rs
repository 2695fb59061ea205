//! Cache Store Module
//!
//! Main cache engine combining an LRU map with TTL expiration. `CacheStore`
//! is not synchronized itself; `MemoryCache` puts it behind a lock and adds
//! the background sweeper.

use std::mem;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::cache::{CacheEntry, CacheMetrics};
use crate::config::CacheConfig;

/// Rough per-entry cost of the LRU map's hash slot and list links.
const NODE_OVERHEAD: u64 = 64;

// == Cache Store ==
/// Cache storage with LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Entries in access order, most recently used first
    entries: LruCache<String, CacheEntry<V>>,
    /// Performance statistics
    metrics: CacheMetrics,
    /// Capacity, default TTL and metrics switch
    config: CacheConfig,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore from the given configuration.
    ///
    /// A `max_size` of zero gives an unbounded cache.
    pub fn new(config: CacheConfig) -> Self {
        let entries = match NonZeroUsize::new(config.max_size) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };

        Self {
            entries,
            metrics: CacheMetrics::new(),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Stores a value under `key`.
    ///
    /// `ttl` of `None` or zero applies the configured default TTL, and a zero
    /// default TTL means the entry never expires. Overwriting keeps the
    /// entry's creation time and moves it to most recently used. Inserting a
    /// new key into a full cache first evicts the least recently used entry.
    pub fn set(&mut self, key: String, value: V, ttl: Option<Duration>) {
        let ttl = match ttl {
            Some(ttl) if !ttl.is_zero() => ttl,
            _ => self.config.default_ttl,
        };

        match self.entries.get_mut(&key) {
            Some(entry) => entry.replace(value, Some(ttl)),
            None => {
                // `push` hands back the LRU tail when the cache was full.
                let entry = CacheEntry::new(value, Some(ttl));
                if self.entries.push(key, entry).is_some() {
                    self.record(|m| m.record_evictions(1));
                }
            }
        }

        self.record(CacheMetrics::record_set);
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.entries.pop(key) {
            Some(_) => {
                self.record(CacheMetrics::record_delete);
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Removes every entry and resets the metrics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.metrics = CacheMetrics::new();
    }

    // == Has ==
    /// Checks for a live entry without touching recency or metrics.
    pub fn has(&self, key: &str) -> bool {
        self.entries
            .peek(key)
            .map_or(false, |entry| !entry.is_expired())
    }

    // == Keys ==
    /// Returns every stored key, most recently used first.
    ///
    /// Expired entries not yet swept are included.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    // == Default TTL ==
    /// Changes the TTL applied to future sets without an explicit TTL.
    pub fn set_default_ttl(&mut self, ttl: Duration) {
        self.config.default_ttl = ttl;
    }

    // == Metrics ==
    /// Returns a snapshot of the current metrics.
    pub fn metrics(&self) -> CacheMetrics {
        let mut metrics = self.metrics.clone();
        metrics.size = self.entries.len();
        metrics.hit_rate = metrics.compute_hit_rate();
        metrics.memory_usage = self.estimate_memory_usage();
        metrics
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Each removal counts as an eviction. Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired.len();
        for key in expired {
            self.entries.pop(&key);
        }

        if count > 0 {
            self.record(|m| m.record_evictions(count as u64));
        }
        count
    }

    // == Length ==
    /// Returns the current number of entries, expired-but-unswept included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn record(&mut self, update: impl FnOnce(&mut CacheMetrics)) {
        if self.config.enable_metrics {
            update(&mut self.metrics);
        }
    }

    fn estimate_memory_usage(&self) -> u64 {
        let slot_size = mem::size_of::<(String, CacheEntry<V>)>() as u64;
        self.entries
            .iter()
            .map(|(key, _)| NODE_OVERHEAD + slot_size + key.len() as u64)
            .sum()
    }
}

impl<V: Clone> CacheStore<V> {
    // == Get ==
    /// Retrieves a value by key.
    ///
    /// A hit moves the entry to most recently used. An expired entry is
    /// removed on discovery and counted as both a miss and an eviction.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let Some(expired) = self.entries.peek(key).map(CacheEntry::is_expired) else {
            self.record(CacheMetrics::record_miss);
            return None;
        };

        if expired {
            self.entries.pop(key);
            self.record(|m| {
                m.record_miss();
                m.record_evictions(1);
            });
            return None;
        }

        let value = self.entries.get_mut(key).map(|entry| {
            entry.touch();
            entry.value.clone()
        });
        self.record(CacheMetrics::record_hit);
        value
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn store(max_size: usize) -> CacheStore<String> {
        CacheStore::new(CacheConfig {
            max_size,
            default_ttl: Duration::from_secs(300),
            ..CacheConfig::default()
        })
    }

    fn set(store: &mut CacheStore<String>, key: &str) {
        store.set(key.to_string(), format!("value_{key}"), None);
    }

    #[test]
    fn test_store_new() {
        let store = store(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(100);
        set(&mut store, "key1");

        assert_eq!(store.get("key1"), Some("value_key1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store(100);
        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.metrics().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store(100);
        set(&mut store, "key1");

        assert!(store.delete("key1"));
        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.metrics().deletes, 1);
    }

    #[test]
    fn test_store_delete_absent_is_noop() {
        let mut store = store(2);
        set(&mut store, "key1");

        assert!(!store.delete("nonexistent"));

        let metrics = store.metrics();
        assert_eq!(store.len(), 1);
        assert_eq!(metrics.deletes, 0);
        assert_eq!(metrics.evictions, 0);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(100);
        store.set("key1".to_string(), "value1".to_string(), None);
        store.set("key1".to_string(), "value2".to_string(), None);

        assert_eq!(store.get("key1"), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.metrics().sets, 2);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store(100);
        store.set("key1".to_string(), "value1".to_string(), Some(Duration::from_millis(50)));

        assert!(store.get("key1").is_some());
        sleep(Duration::from_millis(80));

        assert_eq!(store.get("key1"), None);
        assert_eq!(store.len(), 0, "expired entry is removed on read");
        let metrics = store.metrics();
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.evictions, 1);
    }

    #[test]
    fn test_has_reports_false_for_expired_unswept_entry() {
        let mut store = store(100);
        store.set("k".to_string(), "v".to_string(), Some(Duration::from_millis(30)));
        assert!(store.has("k"));

        sleep(Duration::from_millis(60));

        assert!(!store.has("k"));
        assert_eq!(store.keys(), vec!["k".to_string()], "keys still lists unswept entry");
    }

    #[test]
    fn test_has_does_not_touch_recency_or_metrics() {
        let mut store = store(2);
        set(&mut store, "a");
        set(&mut store, "b");

        assert!(store.has("a"));
        set(&mut store, "c");

        assert!(!store.has("a"), "has must not protect a from eviction");
        let metrics = store.metrics();
        assert_eq!(metrics.hits, 0);
        assert_eq!(metrics.misses, 0);
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3);
        set(&mut store, "key1");
        set(&mut store, "key2");
        set(&mut store, "key3");
        set(&mut store, "key4");

        assert_eq!(store.len(), 3);
        assert!(!store.has("key1"));
        assert!(store.has("key2"));
        assert!(store.has("key3"));
        assert!(store.has("key4"));
        assert_eq!(store.metrics().evictions, 1);
    }

    #[test]
    fn test_capacity_three_scenario() {
        let mut store = store(3);
        set(&mut store, "A");
        set(&mut store, "B");
        set(&mut store, "C");
        assert_eq!(store.len(), 3);

        assert!(store.get("A").is_some());
        set(&mut store, "D");

        let present: Vec<&str> = ["A", "B", "C", "D"]
            .into_iter()
            .filter(|k| store.has(k))
            .collect();
        assert_eq!(present, vec!["A", "C", "D"]);
        assert_eq!(store.metrics().evictions, 1);
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let mut store = store(2);
        set(&mut store, "a");
        set(&mut store, "b");
        store.set("a".to_string(), "again".to_string(), None);

        assert_eq!(store.len(), 2);
        assert_eq!(store.metrics().evictions, 0);
        set(&mut store, "c");
        assert!(!store.has("b"), "overwrite moved a to the front");
    }

    #[test]
    fn test_unbounded_when_max_size_zero() {
        let mut store = store(0);
        for i in 0..2_000 {
            set(&mut store, &i.to_string());
        }
        assert_eq!(store.len(), 2_000);
        assert_eq!(store.metrics().evictions, 0);
    }

    #[test]
    fn test_zero_default_ttl_never_expires() {
        let mut store: CacheStore<u32> = CacheStore::new(CacheConfig {
            default_ttl: Duration::ZERO,
            ..CacheConfig::default()
        });
        store.set("k".to_string(), 1, None);
        store.set("z".to_string(), 2, Some(Duration::ZERO));

        sleep(Duration::from_millis(20));
        assert_eq!(store.cleanup_expired(), 0);
        assert_eq!(store.get("k"), Some(1));
        assert_eq!(store.get("z"), Some(2));
    }

    #[test]
    fn test_set_default_ttl_applies_to_future_sets() {
        let mut store = store(100);
        store.set("old".to_string(), "v".to_string(), None);
        store.set_default_ttl(Duration::from_millis(30));
        store.set("new".to_string(), "v".to_string(), None);

        sleep(Duration::from_millis(60));

        assert!(store.has("old"));
        assert!(!store.has("new"));
        assert_eq!(store.config().default_ttl, Duration::from_millis(30));
    }

    #[test]
    fn test_store_metrics() {
        let mut store = store(100);
        set(&mut store, "key1");
        store.get("key1");
        store.get("nonexistent");

        let metrics = store.metrics();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.sets, 1);
        assert_eq!(metrics.size, 1);
        assert_eq!(metrics.hit_rate, 0.5);
        assert!(metrics.memory_usage > 0);
    }

    #[test]
    fn test_metrics_disabled_keeps_counters_at_zero() {
        let mut store: CacheStore<String> = CacheStore::new(CacheConfig {
            max_size: 1,
            enable_metrics: false,
            ..CacheConfig::default()
        });
        set(&mut store, "a");
        set(&mut store, "b");
        store.get("b");
        store.get("a");
        store.delete("b");

        let metrics = store.metrics();
        assert_eq!(metrics.hits, 0);
        assert_eq!(metrics.misses, 0);
        assert_eq!(metrics.sets, 0);
        assert_eq!(metrics.deletes, 0);
        assert_eq!(metrics.evictions, 0);
        assert_eq!(metrics.size, 0);
    }

    #[test]
    fn test_clear_resets_entries_and_metrics() {
        let mut store = store(100);
        set(&mut store, "a");
        store.get("a");
        store.get("b");

        store.clear();

        let metrics = store.metrics();
        assert!(store.is_empty());
        assert!(store.keys().is_empty());
        assert_eq!(metrics.hits, 0);
        assert_eq!(metrics.misses, 0);
        assert_eq!(metrics.sets, 0);
        assert_eq!(metrics.memory_usage, 0);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store(100);
        store.set("key1".to_string(), "value1".to_string(), Some(Duration::from_millis(30)));
        store.set("key2".to_string(), "value2".to_string(), Some(Duration::from_secs(10)));

        sleep(Duration::from_millis(60));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.metrics().evictions, 1);
        assert!(store.get("key2").is_some());
    }

    #[test]
    fn test_keys_most_recent_first() {
        let mut store = store(100);
        set(&mut store, "a");
        set(&mut store, "b");
        set(&mut store, "c");
        store.get("a");

        assert_eq!(store.keys(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_access_count_tracks_reads() {
        let mut store = store(100);
        set(&mut store, "a");
        store.get("a");
        store.get("a");

        let count = store.entries.peek("a").map(|entry| entry.access_count);
        assert_eq!(count, Some(3));
    }
}
