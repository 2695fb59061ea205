//! Domain records and the request/response DTOs of the HTTP API

pub mod clipboard;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use clipboard::{Clipboard, ClipboardPatch, NewClipboard};
pub use requests::{CreateClipboardRequest, UpdateClipboardRequest};
pub use responses::{ClipboardListResponse, ClipboardResponse, HealthResponse, MessageResponse};
