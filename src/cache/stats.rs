//! Cache Metrics Module
//!
//! Tracks cache performance metrics including hits, misses, sets, deletes
//! and evictions.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Metrics ==
/// Counters for one cache since its last reset.
///
/// The engine mutates these under its own lock; callers only ever see
/// copies returned by `metrics()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheMetrics {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of stores, inserts and overwrites alike
    pub sets: u64,
    /// Number of explicit deletes that removed an entry
    pub deletes: u64,
    /// Number of entries removed by capacity eviction or expiry
    pub evictions: u64,
    /// Current number of entries in the cache
    pub size: usize,
    /// hits / (hits + misses), 0 when there were no lookups
    pub hit_rate: f64,
    /// When the counters were last reset
    pub last_reset: DateTime<Utc>,
    /// Approximate heap footprint of the stored entries
    #[serde(rename = "memory_usage_bytes")]
    pub memory_usage: u64,
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self {
            hits: 0,
            misses: 0,
            sets: 0,
            deletes: 0,
            evictions: 0,
            size: 0,
            hit_rate: 0.0,
            last_reset: Utc::now(),
            memory_usage: 0,
        }
    }
}

impl CacheMetrics {
    // == Constructor ==
    /// Creates a new CacheMetrics with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn compute_hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.hit_rate = self.compute_hit_rate();
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
        self.hit_rate = self.compute_hit_rate();
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    pub fn record_evictions(&mut self, count: u64) {
        self.evictions += count;
    }
}
