//! Cache Module
//!
//! Provides generic in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod handle;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use handle::{CacheHandle, MemoryCache};
pub use stats::CacheMetrics;
pub use store::CacheStore;
