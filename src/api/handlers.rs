//! API Handlers
//!
//! HTTP request handlers for the clipboard and cache management endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::cache::CacheMetrics;
use crate::error::{CacheError, Result};
use crate::models::{
    ClipboardListResponse, ClipboardResponse, CreateClipboardRequest, HealthResponse,
    MessageResponse, UpdateClipboardRequest,
};
use crate::registry::CacheRegistry;
use crate::service::{CachedClipboardService, ClipboardStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registry owning every named cache
    pub registry: Arc<CacheRegistry>,
    /// Cached clipboard operations
    pub clipboards: CachedClipboardService,
}

impl AppState {
    /// Wires the clipboard service onto `registry`'s `clipboard` cache.
    pub async fn new(registry: Arc<CacheRegistry>, store: Arc<dyn ClipboardStore>) -> Result<Self> {
        let clipboards = CachedClipboardService::new(&registry, store).await?;
        Ok(Self {
            registry,
            clipboards,
        })
    }
}

// == Clipboard Handlers ==
/// Handler for GET /api/clipboard
pub async fn list_clipboards_handler(
    State(state): State<AppState>,
) -> Result<Json<ClipboardListResponse>> {
    let clipboards = state.clipboards.get_all().await?;
    Ok(Json(ClipboardListResponse::new(clipboards)))
}

/// Handler for GET /api/clipboard/:id
pub async fn get_clipboard_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ClipboardResponse>> {
    let clipboard = state.clipboards.get_by_id(id).await?;
    Ok(Json(ClipboardResponse::new("Clipboard retrieved", clipboard)))
}

/// Handler for GET /api/clipboard/title/:title
pub async fn get_clipboard_by_title_handler(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<ClipboardResponse>> {
    let clipboard = state.clipboards.get_by_title(&title).await?;
    Ok(Json(ClipboardResponse::new("Clipboard retrieved", clipboard)))
}

/// Handler for GET /api/clipboard/raw/:title
///
/// Returns the bare content as `text/plain`.
pub async fn get_raw_content_handler(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<String> {
    state.clipboards.get_content_by_title(&title).await
}

/// Handler for POST /api/clipboard
pub async fn create_clipboard_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateClipboardRequest>,
) -> Result<(StatusCode, Json<ClipboardResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let clipboard = state.clipboards.create(req.into_new_clipboard()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ClipboardResponse::new("Clipboard created", clipboard)),
    ))
}

/// Handler for PUT /api/clipboard/:id
pub async fn update_clipboard_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateClipboardRequest>,
) -> Result<Json<ClipboardResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let clipboard = state.clipboards.update(id, req.into_patch()).await?;
    Ok(Json(ClipboardResponse::new("Clipboard updated", clipboard)))
}

/// Handler for DELETE /api/clipboard/:id
pub async fn delete_clipboard_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<MessageResponse>> {
    state.clipboards.delete(id).await?;
    Ok(Json(MessageResponse::new("Clipboard deleted")))
}

// == Cache Handlers ==
/// Handler for GET /api/cache/metrics
pub async fn cache_metrics_handler(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, CacheMetrics>> {
    Json(state.registry.all_metrics().await)
}

/// Handler for DELETE /api/cache
pub async fn clear_all_caches_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.registry.clear_all().await;
    info!("All caches cleared via API");
    Json(MessageResponse::new("All caches cleared"))
}

/// Handler for DELETE /api/cache/:name
///
/// Unknown names are accepted and change nothing.
pub async fn clear_cache_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<MessageResponse> {
    state.registry.clear_cache(&name).await;
    info!("Cache '{}' cleared via API", name);
    Json(MessageResponse::new(format!("Cache '{}' cleared", name)))
}

/// Handler for GET /api/health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.registry.all_metrics().await))
}
