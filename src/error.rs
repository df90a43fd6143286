//! Error types for vidstash.

use thiserror::Error;

/// Common error type for vidstash.
#[derive(Error, Debug)]
pub enum VidstashError {
    /// The candidate file is larger than the single-file limit.
    #[error("file too large: {size} bytes exceeds the limit of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    /// Accepting the file would push aggregate usage past the quota.
    #[error("storage quota exceeded: {used} bytes used, {requested} bytes requested, quota is {quota} bytes")]
    QuotaExceeded { used: u64, requested: u64, quota: u64 },

    /// The declared MIME type is not a video type.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// Persisting the uploaded bytes failed.
    #[error("failed to write file: {0}")]
    WriteFailed(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// The request could not be interpreted (missing field, bad name, wrong method).
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for vidstash operations.
pub type Result<T> = std::result::Result<T, VidstashError>;
