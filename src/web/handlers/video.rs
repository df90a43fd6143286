//! Video handlers for Web API.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::storage::format_size;
use crate::web::dto::{
    DeleteResponse, StorageDetailsResponse, StorageInfoQuery, StorageInfoResponse,
    UploadResponse, VideoListResponse, STORAGE_INFO_ACTION,
};
use crate::web::error::{ApiError, ErrorCode};
use crate::web::handlers::AppState;

/// Multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "videoFile";

/// Alternative name accepted for the upload field.
pub const UPLOAD_FIELD_ALIAS: &str = "file";

fn multipart_error(err: MultipartError, max_file_size: u64) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(
            ErrorCode::FileTooLarge,
            format!("The file exceeds the {} limit", format_size(max_file_size)),
        );
    }
    tracing::warn!("Failed to read multipart data: {}", err);
    ApiError::malformed(format!("Invalid multipart data: {}", err.body_text()))
}

/// POST /api/upload - Upload a video.
///
/// Request body: multipart/form-data with the file in `videoFile` (or `file`).
/// The field is streamed into a staging file; other fields are ignored.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "videos",
    request_body(content = crate::web::dto::UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video stored", body = UploadResponse),
        (status = 400, description = "No file field or invalid multipart data", body = crate::web::error::ErrorBody),
        (status = 413, description = "File exceeds the single-file limit", body = crate::web::error::ErrorBody),
        (status = 408, description = "Upload did not finish in time", body = crate::web::error::ErrorBody),
        (status = 415, description = "Not a video", body = crate::web::error::ErrorBody),
        (status = 500, description = "Failed to save the file", body = crate::web::error::ErrorBody),
        (status = 507, description = "Storage quota exceeded", body = crate::web::error::ErrorBody)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        ApiError::malformed(format!("Expected a multipart form: {}", e.body_text()))
    })?;
    let max_file_size = state.store.quota().max_file_size;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size))?
    {
        let name = field.name().unwrap_or("");
        if name != UPLOAD_FIELD && name != UPLOAD_FIELD_ALIAS {
            continue;
        }

        let original_name = field.file_name().unwrap_or("").to_string();
        let declared_mime = field.content_type().map(|s| s.to_string());

        let mut staged = state.store.stage().await?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, max_file_size))?
        {
            staged.write_chunk(&chunk).await?;
        }

        let candidate = staged
            .finish(original_name, declared_mime.as_deref())
            .await?;
        let receipt = state.store.accept_upload(candidate).await?;

        return Ok(Json(UploadResponse::from(receipt)));
    }

    Err(ApiError::malformed(format!(
        "No file was sent (expected the \"{UPLOAD_FIELD}\" field)"
    )))
}

/// GET /api/upload?action=getStorageInfo - Bytes used.
#[utoipa::path(
    get,
    path = "/api/upload",
    tag = "storage",
    responses(
        (status = 200, description = "Bytes used", body = StorageInfoResponse),
        (status = 400, description = "Unknown action", body = crate::web::error::ErrorBody)
    )
)]
pub async fn storage_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StorageInfoQuery>,
) -> Result<Json<StorageInfoResponse>, ApiError> {
    if !query.is_storage_info() {
        return Err(ApiError::malformed(format!(
            "Unsupported action; use action={STORAGE_INFO_ACTION} or POST a file"
        )));
    }

    let used = state.store.used_bytes().await?;
    Ok(Json(StorageInfoResponse {
        success: true,
        used,
    }))
}

/// GET /api/storage - Usage and limits.
#[utoipa::path(
    get,
    path = "/api/storage",
    tag = "storage",
    responses(
        (status = 200, description = "Usage and limits", body = StorageDetailsResponse)
    )
)]
pub async fn storage_details(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StorageDetailsResponse>, ApiError> {
    let usage = state.store.usage().await?;
    Ok(Json(StorageDetailsResponse::new(usage, state.store.quota())))
}

/// GET /api/videos - List stored videos, most recent first.
#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Stored videos", body = VideoListResponse)
    )
)]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VideoListResponse>, ApiError> {
    let listing = state.store.list_videos().await?;
    Ok(Json(VideoListResponse::from(listing)))
}

/// DELETE /api/videos/:name - Delete a stored video.
#[utoipa::path(
    delete,
    path = "/api/videos/{name}",
    tag = "videos",
    params(
        ("name" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "Video deleted", body = DeleteResponse),
        (status = 400, description = "Invalid file name", body = crate::web::error::ErrorBody),
        (status = 404, description = "Video not found", body = crate::web::error::ErrorBody)
    )
)]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let usage = state.store.delete_video(&name).await?;
    Ok(Json(DeleteResponse::from(usage)))
}

/// Fallback for methods a route does not serve.
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Method not allowed")
}

/// Fallback for `/api/upload` methods other than GET and POST.
pub async fn upload_method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Use POST to upload a file")
}
