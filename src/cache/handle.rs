//! Cache Handle Module
//!
//! `MemoryCache` is the thread-safe engine: a `CacheStore` behind a
//! reader/writer lock plus its expiration sweeper. `CacheHandle` is what the
//! registry hands out; after the registry is closed it is a disabled no-op.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{CacheMetrics, CacheStore};
use crate::config::CacheConfig;
use crate::tasks::{spawn_cleanup_task, Sweeper};

struct Shared<V> {
    name: String,
    store: Arc<RwLock<CacheStore<V>>>,
    sweeper: Mutex<Option<Sweeper>>,
}

// == Memory Cache ==
/// A named, thread-safe LRU cache with TTL expiration.
///
/// Cloning is cheap and yields another handle to the same cache. `get`,
/// `set`, `delete` and `clear` take the write lock (a hit moves the entry in
/// the recency list); `has`, `size`, `keys` and `metrics` take the read lock.
pub struct MemoryCache<V> {
    inner: Arc<Shared<V>>,
}

impl<V> Clone for MemoryCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for MemoryCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

impl<V> MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache and starts its expiration sweeper.
    ///
    /// The sweeper is a Tokio task; it is skipped, leaving only expiry on
    /// read, when `cleanup_interval` is zero or no runtime is available.
    pub fn new(name: impl Into<String>, config: CacheConfig) -> Self {
        let name = name.into();

        if !config.eviction_policy.is_implemented() {
            warn!(
                "Cache '{}': eviction policy '{}' is not supported, using lru",
                name, config.eviction_policy
            );
        }

        let interval = config.cleanup_interval;
        let store = Arc::new(RwLock::new(CacheStore::new(config)));

        let sweeper = if interval.is_zero() {
            debug!("Cache '{}': cleanup interval is zero, sweeper disabled", name);
            None
        } else if Handle::try_current().is_err() {
            warn!("Cache '{}': no Tokio runtime, sweeper disabled", name);
            None
        } else {
            Some(spawn_cleanup_task(&name, Arc::downgrade(&store), interval))
        };

        Self {
            inner: Arc::new(Shared {
                name,
                store,
                sweeper: Mutex::new(sweeper),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the value for `key` if present and not expired.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.store.write().await.get(key)
    }

    /// Stores `value` under `key`; a `ttl` of `None` or zero uses the default TTL.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        self.inner.store.write().await.set(key.into(), value, ttl);
    }

    /// Removes `key`; absent keys are ignored.
    pub async fn delete(&self, key: &str) {
        self.inner.store.write().await.delete(key);
    }

    /// Removes every entry and resets the metrics.
    pub async fn clear(&self) {
        self.inner.store.write().await.clear();
    }

    pub async fn has(&self, key: &str) -> bool {
        self.inner.store.read().await.has(key)
    }

    pub async fn size(&self) -> usize {
        self.inner.store.read().await.len()
    }

    /// Point-in-time copy of the stored keys, most recently used first.
    ///
    /// The list may include expired entries the sweeper has not removed yet
    /// and can be stale as soon as the lock is released.
    pub async fn keys(&self) -> Vec<String> {
        self.inner.store.read().await.keys()
    }

    pub async fn set_default_ttl(&self, ttl: Duration) {
        self.inner.store.write().await.set_default_ttl(ttl);
    }

    pub async fn metrics(&self) -> CacheMetrics {
        self.inner.store.read().await.metrics()
    }

    pub async fn config(&self) -> CacheConfig {
        self.inner.store.read().await.config().clone()
    }

    /// Stops the sweeper and waits for it to exit.
    ///
    /// Safe to call more than once. The cache stays usable afterwards with
    /// expiry enforced on read only.
    pub async fn close(&self) {
        let sweeper = self.inner.sweeper.lock().await.take();
        if let Some(sweeper) = sweeper {
            sweeper.stop().await;
            info!("Cache '{}' closed", self.inner.name);
        }
    }

    /// Returns true while the background sweeper is running.
    pub async fn sweeper_running(&self) -> bool {
        self.inner
            .sweeper
            .lock()
            .await
            .as_ref()
            .map_or(false, |sweeper| !sweeper.is_finished())
    }

    /// Returns true if both handles refer to the same cache.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

// == Cache Handle ==
/// A cache obtained from the registry.
///
/// `Disabled` is returned once the registry has been closed: reads miss,
/// writes are dropped and metrics are empty, so shutdown paths never fail.
pub enum CacheHandle<V> {
    Active(MemoryCache<V>),
    Disabled,
}

impl<V> Clone for CacheHandle<V> {
    fn clone(&self) -> Self {
        match self {
            CacheHandle::Active(cache) => CacheHandle::Active(cache.clone()),
            CacheHandle::Disabled => CacheHandle::Disabled,
        }
    }
}

impl<V> fmt::Debug for CacheHandle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheHandle::Active(cache) => f.debug_tuple("Active").field(cache).finish(),
            CacheHandle::Disabled => f.write_str("Disabled"),
        }
    }
}

impl<V> CacheHandle<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn is_disabled(&self) -> bool {
        matches!(self, CacheHandle::Disabled)
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        match self {
            CacheHandle::Active(cache) => cache.get(key).await,
            CacheHandle::Disabled => None,
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        if let CacheHandle::Active(cache) = self {
            cache.set(key, value, ttl).await;
        }
    }

    pub async fn delete(&self, key: &str) {
        if let CacheHandle::Active(cache) = self {
            cache.delete(key).await;
        }
    }

    pub async fn clear(&self) {
        if let CacheHandle::Active(cache) = self {
            cache.clear().await;
        }
    }

    pub async fn has(&self, key: &str) -> bool {
        match self {
            CacheHandle::Active(cache) => cache.has(key).await,
            CacheHandle::Disabled => false,
        }
    }

    pub async fn size(&self) -> usize {
        match self {
            CacheHandle::Active(cache) => cache.size().await,
            CacheHandle::Disabled => 0,
        }
    }

    pub async fn keys(&self) -> Vec<String> {
        match self {
            CacheHandle::Active(cache) => cache.keys().await,
            CacheHandle::Disabled => Vec::new(),
        }
    }

    pub async fn set_default_ttl(&self, ttl: Duration) {
        if let CacheHandle::Active(cache) = self {
            cache.set_default_ttl(ttl).await;
        }
    }

    pub async fn metrics(&self) -> CacheMetrics {
        match self {
            CacheHandle::Active(cache) => cache.metrics().await,
            CacheHandle::Disabled => CacheMetrics::new(),
        }
    }

    pub async fn close(&self) {
        if let CacheHandle::Active(cache) = self {
            cache.close().await;
        }
    }

    /// Returns true if both handles refer to the same live cache.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CacheHandle::Active(a), CacheHandle::Active(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}
