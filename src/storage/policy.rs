//! Upload acceptance policy.
//!
//! A single policy applies to every upload: the file must fit the
//! single-file limit, must fit the remaining quota, and must be declared as
//! `video/<subtype>`.

use super::{DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_TOTAL_STORAGE};
use crate::{Result, VidstashError};

const OCTET_STREAM: &str = "application/octet-stream";

/// Quota limits, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaConfig {
    /// Maximum size of a single file in bytes.
    pub max_file_size: u64,
    /// Maximum aggregate size of the storage directory in bytes.
    pub max_total_storage: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_total_storage: DEFAULT_MAX_TOTAL_STORAGE,
        }
    }
}

impl QuotaConfig {
    /// Create a quota with explicit limits.
    pub fn new(max_file_size: u64, max_total_storage: u64) -> Self {
        Self {
            max_file_size,
            max_total_storage,
        }
    }

    /// Reject a file larger than the single-file limit.
    pub fn check_file_size(&self, size: u64) -> Result<()> {
        if size > self.max_file_size {
            return Err(VidstashError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }
        Ok(())
    }

    /// Reject a file that would push `used` past the total quota.
    pub fn check_quota(&self, used: u64, size: u64) -> Result<()> {
        if used.saturating_add(size) > self.max_total_storage {
            return Err(VidstashError::QuotaExceeded {
                used,
                requested: size,
                quota: self.max_total_storage,
            });
        }
        Ok(())
    }
}

/// Normalize a MIME type: parameters stripped, lower-cased
/// (`"Video/MP4; codecs=avc1"` becomes `"video/mp4"`).
pub fn normalize_mime(raw: &str) -> String {
    raw.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
}

/// Resolve the MIME type to validate for an upload.
///
/// The declared type wins unless it is missing or the generic
/// `application/octet-stream`, in which case the type is guessed from the
/// file name extension.
pub fn resolve_mime(declared: Option<&str>, file_name: &str) -> String {
    let declared = declared.map(normalize_mime).unwrap_or_default();

    if !declared.is_empty() && declared != OCTET_STREAM {
        return declared;
    }

    mime_guess::from_path(file_name)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// Accept only `video/<subtype>` with a non-empty subtype.
pub fn check_video_type(mime: &str) -> Result<()> {
    let normalized = normalize_mime(mime);

    match normalized.split_once('/') {
        Some(("video", subtype))
            if !subtype.is_empty() && !subtype.contains(|c: char| c == '/' || c.is_whitespace()) =>
        {
            Ok(())
        }
        _ => Err(VidstashError::UnsupportedType(if normalized.is_empty() {
            "unknown".to_string()
        } else {
            normalized
        })),
    }
}
