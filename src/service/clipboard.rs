//! Cached Clipboard Service
//!
//! Read-through caching of clipboard lookups with key invalidation on writes.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::store::{ClipboardStore, ClipboardUpdate};
use super::{invalidate, read_through};
use crate::cache::{CacheHandle, CacheMetrics};
use crate::error::Result;
use crate::models::{Clipboard, ClipboardPatch, NewClipboard};
use crate::registry::CacheRegistry;

/// Registry name of the clipboard cache
pub const CACHE_NAME: &str = "clipboard";

/// TTL for single records and raw content
pub const ITEM_TTL: Duration = Duration::from_secs(30 * 60);

/// TTL for the full listing, which changes on every write
pub const LIST_TTL: Duration = Duration::from_secs(5 * 60);

const LIST_ALL_KEY: &str = "clipboard:list:all";

/// Builds the cache key for one lookup dimension, e.g. `clipboard:id:7`.
pub fn clipboard_cache_key(dimension: &str, identifier: &str) -> String {
    format!("clipboard:{}:{}", dimension, identifier)
}

fn id_key(id: u64) -> String {
    clipboard_cache_key("id", &id.to_string())
}

fn title_key(title: &str) -> String {
    clipboard_cache_key("title", title)
}

fn content_key(title: &str) -> String {
    clipboard_cache_key("content", title)
}

/// Every key that can hold data about `clipboard`.
fn keys_for(clipboard: &Clipboard) -> Vec<String> {
    vec![
        id_key(clipboard.id),
        title_key(&clipboard.title),
        content_key(&clipboard.title),
    ]
}

// == Cache Value ==
/// The shapes stored in the clipboard cache, one per key family.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardCacheValue {
    List(Vec<Clipboard>),
    Item(Clipboard),
    Content(String),
}

impl From<Vec<Clipboard>> for ClipboardCacheValue {
    fn from(list: Vec<Clipboard>) -> Self {
        ClipboardCacheValue::List(list)
    }
}

impl From<Clipboard> for ClipboardCacheValue {
    fn from(clipboard: Clipboard) -> Self {
        ClipboardCacheValue::Item(clipboard)
    }
}

impl From<String> for ClipboardCacheValue {
    fn from(content: String) -> Self {
        ClipboardCacheValue::Content(content)
    }
}

impl TryFrom<ClipboardCacheValue> for Vec<Clipboard> {
    type Error = ClipboardCacheValue;

    fn try_from(value: ClipboardCacheValue) -> std::result::Result<Self, Self::Error> {
        match value {
            ClipboardCacheValue::List(list) => Ok(list),
            other => Err(other),
        }
    }
}

impl TryFrom<ClipboardCacheValue> for Clipboard {
    type Error = ClipboardCacheValue;

    fn try_from(value: ClipboardCacheValue) -> std::result::Result<Self, Self::Error> {
        match value {
            ClipboardCacheValue::Item(clipboard) => Ok(clipboard),
            other => Err(other),
        }
    }
}

impl TryFrom<ClipboardCacheValue> for String {
    type Error = ClipboardCacheValue;

    fn try_from(value: ClipboardCacheValue) -> std::result::Result<Self, Self::Error> {
        match value {
            ClipboardCacheValue::Content(content) => Ok(content),
            other => Err(other),
        }
    }
}

// == Cached Clipboard Service ==
/// Clipboard operations backed by a [`ClipboardStore`] and the `clipboard` cache.
///
/// Reads consult the cache first. Successful writes go to the store and then
/// invalidate the listing plus every id, title and content key of the old and
/// new record. Failed writes leave the cache untouched.
#[derive(Clone)]
pub struct CachedClipboardService {
    store: Arc<dyn ClipboardStore>,
    cache: CacheHandle<ClipboardCacheValue>,
}

impl CachedClipboardService {
    /// Builds the service on the registry's `clipboard` cache.
    pub async fn new(registry: &CacheRegistry, store: Arc<dyn ClipboardStore>) -> Result<Self> {
        let cache = registry.get_or_create(CACHE_NAME).await?;
        Ok(Self::with_cache(store, cache))
    }

    pub fn with_cache(store: Arc<dyn ClipboardStore>, cache: CacheHandle<ClipboardCacheValue>) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &CacheHandle<ClipboardCacheValue> {
        &self.cache
    }

    // == Reads ==
    pub async fn get_all(&self) -> Result<Vec<Clipboard>> {
        read_through(&self.cache, LIST_ALL_KEY, LIST_TTL, || self.store.get_all()).await
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Clipboard> {
        read_through(&self.cache, &id_key(id), ITEM_TTL, || self.store.get_by_id(id)).await
    }

    pub async fn get_by_title(&self, title: &str) -> Result<Clipboard> {
        read_through(&self.cache, &title_key(title), ITEM_TTL, || {
            self.store.get_by_title(title)
        })
        .await
    }

    /// Returns only the content of the record titled `title`.
    pub async fn get_content_by_title(&self, title: &str) -> Result<String> {
        read_through(&self.cache, &content_key(title), ITEM_TTL, || async {
            self.store.get_by_title(title).await.map(|c| c.content)
        })
        .await
    }

    // == Writes ==
    pub async fn create(&self, new: NewClipboard) -> Result<Clipboard> {
        let created = self.store.create(new).await?;

        let mut keys = keys_for(&created);
        keys.push(LIST_ALL_KEY.to_string());
        invalidate(&self.cache, &keys).await;

        info!("Created clipboard {} '{}'", created.id, created.title);
        Ok(created)
    }

    /// Applies `patch` to record `id`.
    ///
    /// Keys of the replaced record's title are invalidated along with the new
    /// ones, so a rename never leaves the old title readable from cache. The
    /// replaced record comes from the store's own write, not a prior read, so
    /// a rename committed concurrently is still the one invalidated.
    pub async fn update(&self, id: u64, patch: ClipboardPatch) -> Result<Clipboard> {
        let ClipboardUpdate {
            previous,
            current: updated,
        } = self.store.update(id, patch).await?;

        let mut keys = keys_for(&updated);
        if previous.title != updated.title {
            debug!(
                "Clipboard {} renamed from '{}' to '{}'",
                id, previous.title, updated.title
            );
            keys.extend(keys_for(&previous));
        }
        keys.push(LIST_ALL_KEY.to_string());
        invalidate(&self.cache, &keys).await;

        info!("Updated clipboard {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        let existing = self.store.delete(id).await?;

        let mut keys = keys_for(&existing);
        keys.push(LIST_ALL_KEY.to_string());
        invalidate(&self.cache, &keys).await;

        info!("Deleted clipboard {} '{}'", id, existing.title);
        Ok(())
    }

    // == Cache Management ==
    pub async fn cache_metrics(&self) -> CacheMetrics {
        self.cache.metrics().await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}
