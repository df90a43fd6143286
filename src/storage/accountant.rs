//! Storage accounting.
//!
//! Usage is never cached: every call enumerates the storage directory. Only
//! regular files directly inside the directory count; subdirectories
//! (including the staging area) and symlinks are ignored.

use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::fs;

use crate::Result;

/// Aggregate usage of the storage directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageUsage {
    /// Bytes used by stored files.
    pub used: u64,
    /// Bytes left before the total quota is reached.
    pub available: u64,
}

impl StorageUsage {
    /// Usage for `used` bytes against a total quota of `quota` bytes.
    pub fn new(used: u64, quota: u64) -> Self {
        Self {
            used,
            available: quota.saturating_sub(used),
        }
    }
}

/// A regular file found directly inside the storage directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

/// Result of one pass over the storage directory.
#[derive(Debug, Clone, Default)]
pub struct DirectoryScan {
    /// Listable files: UTF-8 names that do not start with a dot.
    pub files: Vec<ScannedFile>,
    /// Sum of the sizes of every regular file, listable or not.
    pub total_bytes: u64,
}

/// Enumerate regular files directly inside `dir`.
///
/// Entries that disappear between enumeration and `stat` are skipped.
pub async fn scan_directory(dir: &Path) -> Result<DirectoryScan> {
    let mut entries = fs::read_dir(dir).await?;
    let mut scan = DirectoryScan::default();

    while let Some(entry) = entries.next_entry().await? {
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        // DirEntry::metadata does not follow symlinks
        if !metadata.is_file() {
            continue;
        }

        let size = metadata.len();
        scan.total_bytes = scan.total_bytes.saturating_add(size);

        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        scan.files.push(ScannedFile {
            name,
            size,
            modified: metadata.modified().unwrap_or(UNIX_EPOCH),
        });
    }

    Ok(scan)
}

/// Total bytes used by regular files directly inside `dir`.
pub async fn used_bytes(dir: &Path) -> Result<u64> {
    Ok(scan_directory(dir).await?.total_bytes)
}
