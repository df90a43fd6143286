//! Video storage for vidstash.
//!
//! This module owns the storage directory:
//! - Live accounting of used bytes (flat, non-recursive scan)
//! - Upload acceptance policy (file size, quota, video MIME type)
//! - Collision-free naming with atomic no-clobber placement
//! - Listing and deletion

mod accountant;
mod naming;
mod policy;
mod staging;
mod store;

pub use accountant::{scan_directory, used_bytes, DirectoryScan, ScannedFile, StorageUsage};
pub use naming::{is_valid_stored_name, numbered_name, sanitize_file_name, stored_name_for};
pub use policy::{check_video_type, normalize_mime, resolve_mime, QuotaConfig};
pub use staging::{StagedUpload, UploadCandidate};
pub use store::{Listing, StoredVideo, UploadReceipt, VideoStore};

/// One gibibyte.
pub const GIB: u64 = 1024 * 1024 * 1024;

/// Default maximum size of a single file (3 GiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 3 * GIB;

/// Default maximum aggregate storage (999 GiB).
pub const DEFAULT_MAX_TOTAL_STORAGE: u64 = 999 * GIB;

/// Maximum length of a stored file name, in bytes.
pub const MAX_FILE_NAME_LENGTH: usize = 200;

/// Directory inside the storage root that holds in-flight uploads.
///
/// It is hidden (leading dot) so scans and listings skip it.
pub const STAGING_DIR_NAME: &str = ".staging";

/// Format a byte count for humans using binary units ("1.5 KB", "3 GB").
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut scaled = bytes as f64;
    let mut unit = 0;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{scaled:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
