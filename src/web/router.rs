//! Router configuration for Web API.

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::api_doc::{openapi_json, OPENAPI_PATH};
use super::handlers::{
    delete_video, list_videos, method_not_allowed, storage_details, storage_info,
    upload_method_not_allowed, upload_video, AppState,
};
use super::middleware::{create_cors_layer, handle_timeout_error, reject_hidden_paths};
use crate::config::WebConfig;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, config: &WebConfig) -> Router {
    let body_limit = app_state
        .store
        .quota()
        .max_file_size
        .saturating_add(MULTIPART_OVERHEAD);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    // Upload route: large bodies, long timeout
    let upload_routes = Router::new()
        .route(
            "/upload",
            post(upload_video)
                .get(storage_info)
                .fallback(upload_method_not_allowed),
        )
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.upload_timeout_secs,
                ))),
        );

    let video_routes = Router::new()
        .route("/videos", get(list_videos).fallback(method_not_allowed))
        .route(
            "/videos/:name",
            delete(delete_video).fallback(method_not_allowed),
        )
        .route("/storage", get(storage_details).fallback(method_not_allowed));

    let api_routes = Router::new().merge(upload_routes).merge(video_routes);

    Router::new()
        .nest("/api", api_routes)
        .route(OPENAPI_PATH, get(openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&config.cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Serve stored videos under `public_path`.
///
/// Hidden entries, including the staging area, are never served.
pub fn create_files_router(public_path: &str, storage_path: impl AsRef<Path>) -> Router {
    let public_path = public_path.trim_end_matches('/');
    Router::new()
        .nest_service(public_path, ServeDir::new(storage_path))
        .layer(middleware::from_fn(reject_hidden_paths))
}

/// Serve the upload page from `static_path`, if it exists.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let path = Path::new(static_path);
    if !path.is_dir() {
        tracing::warn!("Static directory not found: {}", static_path);
        return None;
    }

    tracing::info!("Serving static files from {}", static_path);
    Some(Router::new().fallback_service(ServeDir::new(path)))
}
