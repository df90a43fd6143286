//! Request timeout handling.

use tower::timeout::error::Elapsed;
use tower::BoxError;

use crate::web::error::{ApiError, ErrorCode};

/// Turn errors from the timeout layer into JSON error responses.
pub async fn handle_timeout_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!("Upload timed out");
        return ApiError::new(ErrorCode::RequestTimeout, "The upload took too long");
    }

    tracing::error!(error = %err, "Unhandled middleware error");
    ApiError::internal("An internal error occurred")
}
