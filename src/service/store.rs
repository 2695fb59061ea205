//! Durable clipboard store
//!
//! The cache wrapper only talks to the store through [`ClipboardStore`];
//! [`InMemoryClipboardStore`] is the bundled implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::models::{Clipboard, ClipboardPatch, NewClipboard};

// == Clipboard Store ==
/// Result of an update: the record as it was replaced and as it is now.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardUpdate {
    pub previous: Clipboard,
    pub current: Clipboard,
}

/// Source of truth for clipboard records.
///
/// `update` and `delete` report the record they replaced, read atomically
/// with the write, so callers can invalidate exactly what was stored.
#[async_trait]
pub trait ClipboardStore: Send + Sync {
    /// All records ordered by id.
    async fn get_all(&self) -> Result<Vec<Clipboard>>;

    async fn get_by_id(&self, id: u64) -> Result<Clipboard>;

    async fn get_by_title(&self, title: &str) -> Result<Clipboard>;

    /// Inserts a record, generating a title when none is given.
    ///
    /// # Errors
    /// [`CacheError::Conflict`] if the title is already taken.
    async fn create(&self, new: NewClipboard) -> Result<Clipboard>;

    /// Applies `patch` to record `id`, refreshing `updated_at`.
    async fn update(&self, id: u64, patch: ClipboardPatch) -> Result<ClipboardUpdate>;

    /// Removes record `id` and returns it.
    async fn delete(&self, id: u64) -> Result<Clipboard>;
}

/// Eight hex digits from four random bytes.
fn random_title() -> String {
    let bytes: [u8; 4] = rand::random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[derive(Debug, Default)]
struct StoreState {
    records: BTreeMap<u64, Clipboard>,
    last_id: u64,
}

impl StoreState {
    fn title_taken(&self, title: &str, except: Option<u64>) -> bool {
        self.records
            .values()
            .any(|c| c.title == title && Some(c.id) != except)
    }

    /// Draws titles from `next` until one is free.
    fn generate_title(&self, mut next: impl FnMut() -> String) -> String {
        loop {
            let title = next();
            if !self.title_taken(&title, None) {
                return title;
            }
            debug!("Generated title '{}' already taken, retrying", title);
        }
    }
}

// == In-Memory Store ==
/// Clipboard store backed by an ordered map behind an async RwLock.
#[derive(Debug, Default)]
pub struct InMemoryClipboardStore {
    state: RwLock<StoreState>,
}

impl InMemoryClipboardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClipboardStore for InMemoryClipboardStore {
    async fn get_all(&self) -> Result<Vec<Clipboard>> {
        let state = self.state.read().await;
        Ok(state.records.values().cloned().collect())
    }

    async fn get_by_id(&self, id: u64) -> Result<Clipboard> {
        let state = self.state.read().await;
        state
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(format!("clipboard {}", id)))
    }

    async fn get_by_title(&self, title: &str) -> Result<Clipboard> {
        let state = self.state.read().await;
        state
            .records
            .values()
            .find(|c| c.title == title)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(format!("clipboard '{}'", title)))
    }

    async fn create(&self, new: NewClipboard) -> Result<Clipboard> {
        let mut state = self.state.write().await;
        let id = state.last_id + 1;

        let title = match new.title.filter(|t| !t.is_empty()) {
            Some(title) if state.title_taken(&title, None) => {
                return Err(CacheError::Conflict(format!(
                    "title '{}' already exists",
                    title
                )));
            }
            Some(title) => title,
            None => state.generate_title(random_title),
        };

        let now = Utc::now();
        let clipboard = Clipboard {
            id,
            title,
            content: new.content,
            created_at: now,
            updated_at: now,
        };

        state.last_id = id;
        state.records.insert(id, clipboard.clone());
        debug!("Stored clipboard {} as '{}'", id, clipboard.title);

        Ok(clipboard)
    }

    async fn update(&self, id: u64, patch: ClipboardPatch) -> Result<ClipboardUpdate> {
        let mut state = self.state.write().await;

        let previous = state
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(format!("clipboard {}", id)))?;

        let mut current = patch.apply(previous.clone());
        if state.title_taken(&current.title, Some(id)) {
            return Err(CacheError::Conflict(format!(
                "title '{}' already exists",
                current.title
            )));
        }

        current.updated_at = Utc::now();
        state.records.insert(id, current.clone());

        Ok(ClipboardUpdate { previous, current })
    }

    async fn delete(&self, id: u64) -> Result<Clipboard> {
        let mut state = self.state.write().await;
        state
            .records
            .remove(&id)
            .ok_or_else(|| CacheError::NotFound(format!("clipboard {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_clipboard(title: Option<&str>, content: &str) -> NewClipboard {
        NewClipboard {
            title: title.map(str::to_string),
            content: content.to_string(),
        }
    }

    fn rename(title: &str) -> ClipboardPatch {
        ClipboardPatch {
            title: Some(title.to_string()),
            content: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = InMemoryClipboardStore::new();
        let a = store.create(new_clipboard(Some("a"), "1")).await.unwrap();
        let b = store.create(new_clipboard(Some("b"), "2")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_generates_title_when_missing() {
        let store = InMemoryClipboardStore::new();
        let a = store.create(new_clipboard(None, "x")).await.unwrap();
        let b = store.create(new_clipboard(Some(""), "y")).await.unwrap();

        assert_eq!(a.title.len(), 8);
        assert!(a.title.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.title, b.title);
    }

    #[test]
    fn test_random_titles_differ() {
        let titles: std::collections::HashSet<String> = (0..64).map(|_| random_title()).collect();
        // 64 draws from 2^32 values; a repeat here means the source is not random.
        assert_eq!(titles.len(), 64);
        assert!(titles.iter().all(|t| t.len() == 8));
    }

    #[test]
    fn test_generated_title_retries_on_collision() {
        let mut state = StoreState::default();
        let taken = Clipboard {
            id: 1,
            title: "deadbeef".to_string(),
            content: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.records.insert(1, taken);

        let mut candidates = vec!["0badf00d", "deadbeef"];
        let title = state.generate_title(|| candidates.pop().unwrap_or("ffffffff").to_string());

        assert_eq!(title, "0badf00d");
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_title_conflicts() {
        let store = InMemoryClipboardStore::new();
        store.create(new_clipboard(Some("dup"), "1")).await.unwrap();

        let err = store.create(new_clipboard(Some("dup"), "2")).await.unwrap_err();
        assert!(matches!(err, CacheError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_lookup_by_title_and_id() {
        let store = InMemoryClipboardStore::new();
        let created = store.create(new_clipboard(Some("notes"), "hi")).await.unwrap();

        assert_eq!(store.get_by_title("notes").await.unwrap(), created);
        assert_eq!(store.get_by_id(created.id).await.unwrap(), created);
        assert!(store.get_by_title("missing").await.unwrap_err().is_not_found());
        assert!(store.get_by_id(99).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_rejects_taken_title() {
        let store = InMemoryClipboardStore::new();
        store.create(new_clipboard(Some("a"), "1")).await.unwrap();
        let b = store.create(new_clipboard(Some("b"), "2")).await.unwrap();

        assert!(matches!(
            store.update(b.id, rename("a")).await.unwrap_err(),
            CacheError::Conflict(_)
        ));
        assert_eq!(store.get_by_id(b.id).await.unwrap().title, "b");
    }

    #[tokio::test]
    async fn test_update_reports_replaced_record() {
        let store = InMemoryClipboardStore::new();
        let a = store.create(new_clipboard(Some("a"), "1")).await.unwrap();

        let patch = ClipboardPatch {
            title: Some("renamed".to_string()),
            content: Some("2".to_string()),
        };
        let update = store.update(a.id, patch).await.unwrap();

        assert_eq!(update.previous, a);
        assert_eq!(update.current.title, "renamed");
        assert_eq!(update.current.content, "2");
        assert_eq!(update.current.created_at, a.created_at);
        assert!(update.current.updated_at >= a.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = InMemoryClipboardStore::new();
        assert!(store.update(3, rename("x")).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_returns_removed_record() {
        let store = InMemoryClipboardStore::new();
        let a = store.create(new_clipboard(Some("a"), "1")).await.unwrap();

        assert_eq!(store.delete(a.id).await.unwrap(), a);
        assert!(store.delete(a.id).await.unwrap_err().is_not_found());
    }
}
