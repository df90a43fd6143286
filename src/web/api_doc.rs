//! OpenAPI documentation.

use axum::Json;
use utoipa::OpenApi;

use super::dto;
use super::error;
use super::handlers;

/// Path the OpenAPI document is served at.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "vidstash API",
        version = "0.1.0",
        description = "Video upload server with per-file and total storage quotas."
    ),
    paths(
        handlers::video::upload_video,
        handlers::video::storage_info,
        handlers::video::storage_details,
        handlers::video::list_videos,
        handlers::video::delete_video,
    ),
    components(schemas(
        dto::UploadForm,
        dto::UploadResponse,
        dto::VideoEntry,
        dto::VideoListResponse,
        dto::DeleteResponse,
        dto::StorageInfoResponse,
        dto::StorageDetailsResponse,
        error::ErrorBody,
        error::ErrorCode,
    )),
    tags(
        (name = "videos", description = "Upload, list and delete videos"),
        (name = "storage", description = "Storage usage and limits")
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        assert!(paths.contains(&"/api/upload".to_string()));
        assert!(paths.contains(&"/api/storage".to_string()));
        assert!(paths.contains(&"/api/videos".to_string()));
        assert!(paths.contains(&"/api/videos/{name}".to_string()));
    }

    #[test]
    fn test_openapi_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.unwrap().schemas;

        assert!(schemas.contains_key("UploadResponse"));
        assert!(schemas.contains_key("ErrorBody"));
    }
}
