//! Cache Registry
//!
//! Creates, configures and tracks named cache instances. Each name is bound
//! to the value type it was first created with for the registry's lifetime.

use std::any::{type_name, Any};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{CacheHandle, CacheMetrics, MemoryCache};
use crate::config::{process_env, CacheConfig, EnvLookup};
use crate::error::{CacheError, Result};

// == Managed Cache ==
/// Type-independent view of a cache, used for cross-cutting operations.
#[async_trait]
pub trait ManagedCache: Send + Sync {
    /// Name of the value type the cache was created for
    fn value_type(&self) -> &'static str;
    fn as_any(&self) -> &(dyn Any + Send + Sync);
    async fn metrics(&self) -> CacheMetrics;
    async fn clear(&self);
    async fn close(&self);
}

#[async_trait]
impl<V> ManagedCache for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn value_type(&self) -> &'static str {
        type_name::<V>()
    }

    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }

    async fn metrics(&self) -> CacheMetrics {
        MemoryCache::metrics(self).await
    }

    async fn clear(&self) {
        MemoryCache::clear(self).await
    }

    async fn close(&self) {
        MemoryCache::close(self).await
    }
}

#[derive(Default)]
struct RegistryState {
    caches: HashMap<String, Box<dyn ManagedCache>>,
    configs: HashMap<String, CacheConfig>,
    closed: bool,
}

// == Cache Registry ==
/// Owns every named cache it creates.
///
/// Services hold [`CacheHandle`]s obtained from [`CacheRegistry::get_or_create`];
/// the registry stops all sweepers on [`CacheRegistry::close`], after which it
/// only hands out disabled handles.
pub struct CacheRegistry {
    state: RwLock<RegistryState>,
    lookup: EnvLookup,
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry").finish_non_exhaustive()
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheRegistry {
    /// Creates a registry that resolves configuration from the process environment.
    pub fn new() -> Self {
        Self::with_lookup(process_env())
    }

    /// Creates a registry that resolves configuration through `lookup`.
    pub fn with_lookup(lookup: EnvLookup) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            lookup,
        }
    }

    // == Get Or Create ==
    /// Returns the cache registered under `name`, creating it on first use.
    ///
    /// Creation happens under the registry's write lock, so concurrent first
    /// calls for one name all receive the same instance. Once the registry is
    /// closed this returns [`CacheHandle::Disabled`].
    ///
    /// # Errors
    /// [`CacheError::TypeMismatch`] if `name` already holds another value type.
    pub async fn get_or_create<V>(&self, name: &str) -> Result<CacheHandle<V>>
    where
        V: Clone + Send + Sync + 'static,
    {
        let mut state = self.state.write().await;

        if state.closed {
            debug!("Registry closed, returning disabled cache for '{}'", name);
            return Ok(CacheHandle::Disabled);
        }

        if let Some(existing) = state.caches.get(name) {
            return match existing.as_any().downcast_ref::<MemoryCache<V>>() {
                Some(cache) => Ok(CacheHandle::Active(cache.clone())),
                None => Err(CacheError::TypeMismatch {
                    name: name.to_string(),
                    existing: existing.value_type(),
                    requested: type_name::<V>(),
                }),
            };
        }

        let config = match state.configs.get(name) {
            Some(config) => config.clone(),
            None => {
                let config = CacheConfig::resolve(name, &*self.lookup);
                state.configs.insert(name.to_string(), config.clone());
                config
            }
        };

        info!(
            "Creating cache '{}': default_ttl={:?}, max_size={}, cleanup_interval={:?}, metrics={}",
            name, config.default_ttl, config.max_size, config.cleanup_interval, config.enable_metrics
        );

        let cache = MemoryCache::<V>::new(name, config);
        state
            .caches
            .insert(name.to_string(), Box::new(cache.clone()));

        Ok(CacheHandle::Active(cache))
    }

    // == Set Config ==
    /// Pre-registers configuration for `name`.
    ///
    /// Takes precedence over environment settings, but only if the cache has
    /// not been created yet; later calls are ignored.
    pub async fn set_config(&self, name: &str, config: CacheConfig) {
        let mut state = self.state.write().await;
        if state.closed {
            return;
        }
        if state.caches.contains_key(name) {
            warn!("Cache '{}' already exists, ignoring new configuration", name);
            return;
        }
        state.configs.insert(name.to_string(), config);
    }

    /// Returns the configuration `name` was or will be created with.
    pub async fn config(&self, name: &str) -> Option<CacheConfig> {
        self.state.read().await.configs.get(name).cloned()
    }

    /// Returns the names of all created caches, sorted.
    pub async fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().await.caches.keys().cloned().collect();
        names.sort();
        names
    }

    // == Metrics ==
    /// Returns a metrics snapshot for every created cache.
    pub async fn all_metrics(&self) -> BTreeMap<String, CacheMetrics> {
        let state = self.state.read().await;
        let mut metrics = BTreeMap::new();
        for (name, cache) in &state.caches {
            metrics.insert(name.clone(), cache.metrics().await);
        }
        metrics
    }

    // == Clear ==
    /// Clears the cache named `name`; unknown names are ignored.
    pub async fn clear_cache(&self, name: &str) {
        let state = self.state.read().await;
        if let Some(cache) = state.caches.get(name) {
            cache.clear().await;
            debug!("Cleared cache '{}'", name);
        }
    }

    /// Clears every created cache.
    pub async fn clear_all(&self) {
        let state = self.state.read().await;
        for cache in state.caches.values() {
            cache.clear().await;
        }
        debug!("Cleared {} caches", state.caches.len());
    }

    // == Close ==
    /// Stops every cache's sweeper, forgets all caches and configuration,
    /// and marks the registry permanently closed. Safe to call more than once.
    pub async fn close(&self) {
        let caches = {
            let mut state = self.state.write().await;
            if state.closed {
                return;
            }
            state.closed = true;
            state.configs.clear();
            std::mem::take(&mut state.caches)
        };

        let count = caches.len();
        for cache in caches.values() {
            cache.close().await;
        }
        info!("Cache registry closed, {} caches stopped", count);
    }

    pub async fn is_closed(&self) -> bool {
        self.state.read().await.closed
    }
}

// == Global Registry ==
static GLOBAL: OnceLock<CacheRegistry> = OnceLock::new();

/// Returns the lazily created process-wide registry.
///
/// Convenience for call sites without an injected registry; everything in
/// this crate also works with an explicitly constructed [`CacheRegistry`].
pub fn global() -> &'static CacheRegistry {
    GLOBAL.get_or_init(CacheRegistry::new)
}
