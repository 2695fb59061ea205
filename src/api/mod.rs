//! API Module
//!
//! HTTP handlers and routing for the clipboard service and cache management.
//!
//! # Endpoints
//! - `GET /api/health` - Health check with per-cache metrics
//! - `GET /api/cache/metrics` - Metrics of every cache
//! - `DELETE /api/cache` - Clear all caches
//! - `DELETE /api/cache/:name` - Clear one cache
//! - `GET|POST /api/clipboard` - List or create clipboards
//! - `GET|PUT|DELETE /api/clipboard/:id` - Read, update or delete one clipboard
//! - `GET /api/clipboard/title/:title` - Lookup by title
//! - `GET /api/clipboard/raw/:title` - Plain-text content by title

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
