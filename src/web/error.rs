//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::storage::format_size;
use crate::VidstashError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// File larger than the single-file limit (413).
    FileTooLarge,
    /// Upload would exceed the total quota (507).
    QuotaExceeded,
    /// Not a video (415).
    UnsupportedType,
    /// Storing the file failed (500).
    WriteFailed,
    /// Not found (404).
    NotFound,
    /// Missing file field, bad name or wrong method (400).
    MalformedRequest,
    /// Upload did not finish in time (408).
    RequestTimeout,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::QuotaExceeded => StatusCode::INSUFFICIENT_STORAGE,
            ErrorCode::UnsupportedType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorCode::WriteFailed => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::MalformedRequest => StatusCode::BAD_REQUEST,
            ErrorCode::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message.
    pub error: String,
    /// Error code.
    pub code: ErrorCode,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    status: Option<StatusCode>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
        }
    }

    /// Create a malformed request error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedRequest, message)
    }

    /// Create a malformed request error answered with 405.
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self {
            status: Some(StatusCode::METHOD_NOT_ALLOWED),
            ..Self::malformed(message)
        }
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the HTTP status sent with this error.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or_else(|| self.code.status_code())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            success: false,
            error: self.message,
            code: self.code,
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<VidstashError> for ApiError {
    fn from(err: VidstashError) -> Self {
        match err {
            VidstashError::FileTooLarge { max, .. } => ApiError::new(
                ErrorCode::FileTooLarge,
                format!("The file exceeds the {} limit", format_size(max)),
            ),
            VidstashError::QuotaExceeded {
                used,
                requested,
                quota,
            } => ApiError::new(
                ErrorCode::QuotaExceeded,
                format!(
                    "Storage limit exceeded ({}): {} requested, {} available",
                    format_size(quota),
                    format_size(requested),
                    format_size(quota.saturating_sub(used))
                ),
            ),
            VidstashError::UnsupportedType(mime) => ApiError::new(
                ErrorCode::UnsupportedType,
                format!("Only video files are allowed (received {mime})"),
            ),
            VidstashError::WriteFailed(msg) => {
                tracing::error!("Failed to store upload: {}", msg);
                ApiError::new(ErrorCode::WriteFailed, "Failed to save the file")
            }
            VidstashError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
            VidstashError::MalformedRequest(msg) => ApiError::malformed(msg),
            err @ (VidstashError::Io(_) | VidstashError::Config(_)) => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}
