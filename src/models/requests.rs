//! Request DTOs for the clipboard API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::models::{ClipboardPatch, NewClipboard};

/// Maximum allowed title length in characters
pub const MAX_TITLE_LENGTH: usize = 255;

/// Request body for POST /api/clipboard
///
/// # Fields
/// - `title`: Optional unique title; generated when missing or empty
/// - `content`: The clipboard content, required
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClipboardRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl CreateClipboardRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.content.is_empty() {
            return Some("Content is required".to_string());
        }
        validate_title(self.title.as_deref())
    }

    pub fn into_new_clipboard(self) -> NewClipboard {
        NewClipboard {
            title: self.title.filter(|t| !t.is_empty()),
            content: self.content,
        }
    }
}

/// Request body for PUT /api/clipboard/:id
///
/// Empty strings are treated as "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClipboardRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl UpdateClipboardRequest {
    pub fn validate(&self) -> Option<String> {
        validate_title(self.title.as_deref())
    }

    pub fn into_patch(self) -> ClipboardPatch {
        ClipboardPatch {
            title: self.title.filter(|t| !t.is_empty()),
            content: self.content.filter(|c| !c.is_empty()),
        }
    }
}

fn validate_title(title: Option<&str>) -> Option<String> {
    match title {
        Some(title) if title.chars().count() > MAX_TITLE_LENGTH => Some(format!(
            "Title exceeds maximum length of {} characters",
            MAX_TITLE_LENGTH
        )),
        Some(title) if title.contains('/') => Some("Title cannot contain '/'".to_string()),
        _ => None,
    }
}
