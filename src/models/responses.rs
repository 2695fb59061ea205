//! Response DTOs for the HTTP API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheMetrics;
use crate::models::Clipboard;

/// Response body for single-entry clipboard operations
#[derive(Debug, Clone, Serialize)]
pub struct ClipboardResponse {
    pub message: String,
    pub data: Clipboard,
}

impl ClipboardResponse {
    pub fn new(message: impl Into<String>, data: Clipboard) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// Response body for GET /api/clipboard
#[derive(Debug, Clone, Serialize)]
pub struct ClipboardListResponse {
    pub count: usize,
    pub data: Vec<Clipboard>,
}

impl ClipboardListResponse {
    pub fn new(data: Vec<Clipboard>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// Response body carrying only a message
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the health endpoint (GET /api/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Number of live caches
    pub caches: usize,
    /// Metrics per cache name
    pub metrics: BTreeMap<String, CacheMetrics>,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(metrics: BTreeMap<String, CacheMetrics>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            caches: metrics.len(),
            metrics,
        }
    }
}
