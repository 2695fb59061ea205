//! Clipcache - named in-memory caches with TTL expiration and LRU eviction
//!
//! Provides a registry of typed caches, a cache-aside wrapper for a durable
//! clipboard store, and an HTTP API exposing both.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod service;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{CacheHandle, CacheMetrics, MemoryCache};
pub use config::{CacheConfig, ServerConfig};
pub use error::{CacheError, Result};
pub use registry::{global, CacheRegistry};
pub use service::{read_through, invalidate, CachedClipboardService, InMemoryClipboardStore};
