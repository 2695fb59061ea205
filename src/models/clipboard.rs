//! Clipboard record as held by the durable store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A clipboard entry. `title` is unique across all entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clipboard {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new entry. An empty or missing title is generated by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewClipboard {
    pub title: Option<String>,
    pub content: String,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipboardPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ClipboardPatch {
    /// Returns `clipboard` with the patch applied.
    pub fn apply(&self, mut clipboard: Clipboard) -> Clipboard {
        if let Some(title) = &self.title {
            clipboard.title = title.clone();
        }
        if let Some(content) = &self.content {
            clipboard.content = content.clone();
        }
        clipboard
    }
}
