//! Service Module
//!
//! Cache-aside wrappers around durable data sources. Reads go through
//! [`read_through`]; every successful write drops the affected keys with
//! [`invalidate`] so the next read refetches.

mod clipboard;
mod store;

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::cache::CacheHandle;
use crate::error::Result;

pub use clipboard::{clipboard_cache_key, CachedClipboardService, ClipboardCacheValue};
pub use store::{ClipboardStore, ClipboardUpdate, InMemoryClipboardStore};

// == Read Through ==
/// Returns the value cached under `key`, or fetches it, caches it for `ttl`
/// and returns it.
///
/// `V` is the cache's value type and `T` the caller's; for single-type caches
/// they are the same. Fetch errors are returned unchanged and nothing is
/// cached. A cached value of an unexpected shape is treated as a miss.
pub async fn read_through<V, T, F, Fut>(
    cache: &CacheHandle<V>,
    key: &str,
    ttl: Duration,
    fetch: F,
) -> Result<T>
where
    V: Clone + Send + Sync + 'static + From<T>,
    T: Clone + TryFrom<V>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if let Some(cached) = cache.get(key).await {
        match T::try_from(cached) {
            Ok(value) => return Ok(value),
            Err(_) => debug!("Cached value under '{}' has unexpected shape, refetching", key),
        }
    }

    let value = fetch().await?;
    cache.set(key, V::from(value.clone()), Some(ttl)).await;
    Ok(value)
}

// == Invalidate ==
/// Deletes each of `keys` from the cache.
pub async fn invalidate<V>(cache: &CacheHandle<V>, keys: &[String])
where
    V: Clone + Send + Sync + 'static,
{
    for key in keys {
        cache.delete(key).await;
    }
    debug!("Invalidated {} cache keys", keys.len());
}
