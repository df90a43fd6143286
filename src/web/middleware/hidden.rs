//! Hide dot-files from static file serving.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::web::error::ApiError;

/// Whether any segment of `path` names a hidden entry (`.staging`, `.env`, ...).
///
/// Percent-encoded leading dots count too, since `ServeDir` decodes them.
pub fn is_hidden_path(path: &str) -> bool {
    path.split('/').any(|segment| {
        segment.starts_with('.')
            || segment
                .get(..3)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("%2e"))
    })
}

/// Answer 404 for hidden paths before they reach the file service.
pub async fn reject_hidden_paths(req: Request, next: Next) -> Response {
    if is_hidden_path(req.uri().path()) {
        tracing::debug!(path = %req.uri().path(), "Refused hidden path");
        return ApiError::not_found("File not found").into_response();
    }
    next.run(req).await
}
