//! API Routes
//!
//! Configures the Axum router with all endpoints under `/api`.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_metrics_handler, clear_all_caches_handler, clear_cache_handler,
    create_clipboard_handler, delete_clipboard_handler, get_clipboard_by_title_handler,
    get_clipboard_handler, get_raw_content_handler, health_handler, list_clipboards_handler,
    update_clipboard_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let clipboard = Router::new()
        .route("/", get(list_clipboards_handler).post(create_clipboard_handler))
        .route(
            "/:id",
            get(get_clipboard_handler)
                .put(update_clipboard_handler)
                .delete(delete_clipboard_handler),
        )
        .route("/title/:title", get(get_clipboard_by_title_handler))
        .route("/raw/:title", get(get_raw_content_handler));

    let cache = Router::new()
        .route("/", delete(clear_all_caches_handler))
        .route("/metrics", get(cache_metrics_handler))
        .route("/:name", delete(clear_cache_handler));

    let api = Router::new()
        .route("/health", get(health_handler))
        .nest("/clipboard", clipboard)
        .nest("/cache", cache);

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
