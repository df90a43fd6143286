//! The video store: one flat storage directory plus its quota.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::TempPath;
use tokio::fs;
use tokio::sync::Mutex;

use super::accountant::{scan_directory, used_bytes, StorageUsage};
use super::naming::{is_valid_stored_name, numbered_name, stored_name_for};
use super::policy::{check_video_type, QuotaConfig};
use super::staging::{StagedUpload, UploadCandidate};
use super::STAGING_DIR_NAME;
use crate::{Result, VidstashError};

/// Upper bound on collision suffixes tried for one upload.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// A stored video as seen by the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVideo {
    /// Stored (resolved) file name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified_at: DateTime<Utc>,
    /// Public URL of the file.
    pub url: String,
}

/// Snapshot of the storage directory.
#[derive(Debug, Clone)]
pub struct Listing {
    /// Stored videos, most recently modified first.
    pub videos: Vec<StoredVideo>,
    /// Aggregate usage at the time of the scan.
    pub usage: StorageUsage,
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Resolved file name on disk.
    pub name: String,
    /// Final size in bytes.
    pub size: u64,
    /// Public URL of the file.
    pub url: String,
    /// Aggregate usage after the upload.
    pub usage: StorageUsage,
}

/// Video storage backed by a single flat directory.
///
/// ```text
/// {base_path}/
/// ├── .staging/          in-flight uploads, never listed or counted
/// ├── holiday.mp4
/// ├── holiday-1.mp4
/// └── talk.webm
/// ```
///
/// The quota check, name resolution and final rename of an upload, as well as
/// deletions, run under one mutex so concurrent requests cannot jointly
/// exceed the quota or overwrite each other.
#[derive(Debug)]
pub struct VideoStore {
    base_path: PathBuf,
    staging_path: PathBuf,
    public_path: String,
    quota: QuotaConfig,
    lock: Mutex<()>,
}

impl VideoStore {
    /// Open the store at `base_path`, creating the directory if needed.
    ///
    /// Staging files left behind by a previous process are removed.
    pub async fn open(
        base_path: impl Into<PathBuf>,
        public_path: impl Into<String>,
        quota: QuotaConfig,
    ) -> Result<Self> {
        let base_path = base_path.into();
        let staging_path = base_path.join(STAGING_DIR_NAME);
        fs::create_dir_all(&staging_path).await?;

        let removed = purge_directory(&staging_path).await?;
        if removed > 0 {
            tracing::info!(removed, "Removed stale staging files");
        }

        let public_path = public_path.into().trim_end_matches('/').to_string();

        Ok(Self {
            base_path,
            staging_path,
            public_path,
            quota,
            lock: Mutex::new(()),
        })
    }

    /// Get the storage directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the quota limits.
    pub fn quota(&self) -> QuotaConfig {
        self.quota
    }

    /// Public URL for a stored name.
    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.public_path, name)
    }

    /// Bytes currently used in the storage directory.
    pub async fn used_bytes(&self) -> Result<u64> {
        used_bytes(&self.base_path).await
    }

    /// Current usage against the total quota.
    pub async fn usage(&self) -> Result<StorageUsage> {
        let used = self.used_bytes().await?;
        Ok(StorageUsage::new(used, self.quota.max_total_storage))
    }

    /// Start receiving an upload.
    ///
    /// The current usage is captured so the upload stops streaming as soon
    /// as it cannot fit; `accept_upload` still makes the final check.
    pub async fn stage(&self) -> Result<StagedUpload> {
        let used = self.used_bytes().await?;
        StagedUpload::create(&self.staging_path, self.quota, used)
    }

    /// Validate a received upload and move it into the storage directory.
    ///
    /// Checks run in order and the first failure wins: file size, quota,
    /// MIME type. The file is then placed under its sanitized name, numbered
    /// on collision. A rejected candidate is discarded.
    pub async fn accept_upload(&self, candidate: UploadCandidate) -> Result<UploadReceipt> {
        let _guard = self.lock.lock().await;

        let UploadCandidate {
            temp,
            original_name,
            size,
            mime,
        } = candidate;

        if let Err(e) = self.validate(size, &mime).await {
            tracing::warn!(file = %original_name, size, mime = %mime, error = %e, "Upload rejected");
            return Err(e);
        }

        let preferred = stored_name_for(&original_name, Some(&mime));
        let name = self.persist_unique(temp, &preferred)?;
        let usage = self.usage().await?;

        tracing::info!(
            file = %name,
            original = %original_name,
            size,
            used = usage.used,
            "Upload accepted"
        );

        Ok(UploadReceipt {
            url: self.url_for(&name),
            name,
            size,
            usage,
        })
    }

    /// Stage `content` and accept it in one step.
    pub async fn store_bytes(
        &self,
        original_name: &str,
        declared_mime: Option<&str>,
        content: &[u8],
    ) -> Result<UploadReceipt> {
        let mut staged = self.stage().await?;
        staged.write_chunk(content).await?;
        let candidate = staged.finish(original_name, declared_mime).await?;
        self.accept_upload(candidate).await
    }

    /// Snapshot of every stored video, most recently modified first.
    pub async fn list_videos(&self) -> Result<Listing> {
        let scan = scan_directory(&self.base_path).await?;

        let mut files = scan.files;
        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));

        let videos = files
            .into_iter()
            .map(|f| StoredVideo {
                url: self.url_for(&f.name),
                modified_at: DateTime::<Utc>::from(f.modified),
                name: f.name,
                size: f.size,
            })
            .collect();

        Ok(Listing {
            videos,
            usage: StorageUsage::new(scan.total_bytes, self.quota.max_total_storage),
        })
    }

    /// Delete a stored video by exact name and return the refreshed usage.
    pub async fn delete_video(&self, name: &str) -> Result<StorageUsage> {
        if !is_valid_stored_name(name) {
            return Err(VidstashError::MalformedRequest(format!(
                "invalid file name: {name:?}"
            )));
        }

        let _guard = self.lock.lock().await;
        let path = self.base_path.join(name);

        match fs::symlink_metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(VidstashError::NotFound(format!("File {name}"))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(VidstashError::NotFound(format!("File {name}")));
            }
            Err(e) => return Err(e.into()),
        }

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(VidstashError::NotFound(format!("File {name}")));
            }
            Err(e) => return Err(e.into()),
        }

        let usage = self.usage().await?;
        tracing::info!(file = %name, used = usage.used, "Video deleted");
        Ok(usage)
    }

    async fn validate(&self, size: u64, mime: &str) -> Result<()> {
        self.quota.check_file_size(size)?;
        let used = self.used_bytes().await?;
        self.quota.check_quota(used, size)?;
        check_video_type(mime)
    }

    /// Rename the staged file to the first free numbered variant of `preferred`.
    ///
    /// Persisting never replaces an existing entry, so the name found here is
    /// free even against writers outside this process.
    fn persist_unique(&self, mut temp: TempPath, preferred: &str) -> Result<String> {
        for n in 0..MAX_NAME_ATTEMPTS {
            let name = numbered_name(preferred, n);
            match temp.persist_noclobber(self.base_path.join(&name)) {
                Ok(()) => return Ok(name),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => temp = e.path,
                Err(e) => {
                    tracing::error!(file = %name, error = %e.error, "Failed to persist upload");
                    return Err(VidstashError::WriteFailed(e.error.to_string()));
                }
            }
        }

        Err(VidstashError::WriteFailed(format!(
            "no free name for {preferred} after {MAX_NAME_ATTEMPTS} attempts"
        )))
    }
}

/// Remove every regular file in `dir`, returning how many were removed.
async fn purge_directory(dir: &Path) -> Result<usize> {
    let mut entries = fs::read_dir(dir).await?;
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() && fs::remove_file(entry.path()).await.is_ok() {
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    async fn setup_store(quota: QuotaConfig) -> (TempDir, VideoStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = VideoStore::open(temp_dir.path(), "/uploads", quota)
            .await
            .unwrap();
        (temp_dir, store)
    }

    fn staging_entries(store: &VideoStore) -> usize {
        std::fs::read_dir(store.base_path().join(STAGING_DIR_NAME))
            .unwrap()
            .count()
    }

    fn set_mtime(path: &Path, secs: u64) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[tokio::test]
    async fn test_open_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("videos");

        let store = VideoStore::open(&base, "/uploads/", QuotaConfig::default())
            .await
            .unwrap();

        assert!(base.is_dir());
        assert!(base.join(STAGING_DIR_NAME).is_dir());
        assert_eq!(store.base_path(), base);
        assert_eq!(store.url_for("a.mp4"), "/uploads/a.mp4");
    }

    #[tokio::test]
    async fn test_open_purges_stale_staging_files() {
        let temp_dir = TempDir::new().unwrap();
        let staging = temp_dir.path().join(STAGING_DIR_NAME);
        std::fs::create_dir_all(&staging).unwrap();
        std::fs::write(staging.join(".upload-old.part"), b"partial").unwrap();

        let store = VideoStore::open(temp_dir.path(), "/uploads", QuotaConfig::default())
            .await
            .unwrap();

        assert_eq!(staging_entries(&store), 0);
    }

    #[tokio::test]
    async fn test_accept_upload() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(100, 1000)).await;

        let receipt = store
            .store_bytes("clip.mp4", Some("video/mp4"), b"12345")
            .await
            .unwrap();

        assert_eq!(receipt.name, "clip.mp4");
        assert_eq!(receipt.size, 5);
        assert_eq!(receipt.url, "/uploads/clip.mp4");
        assert_eq!(receipt.usage, StorageUsage::new(5, 1000));
        assert_eq!(
            std::fs::read(store.base_path().join("clip.mp4")).unwrap(),
            b"12345"
        );
        assert_eq!(staging_entries(&store), 0);
    }

    #[tokio::test]
    async fn test_usage_grows_by_accepted_size() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(100, 1000)).await;
        store
            .store_bytes("a.mp4", Some("video/mp4"), &[1u8; 17])
            .await
            .unwrap();
        let before = store.used_bytes().await.unwrap();

        let receipt = store
            .store_bytes("b.webm", Some("video/webm"), &[2u8; 23])
            .await
            .unwrap();

        assert_eq!(store.used_bytes().await.unwrap(), before + receipt.size);
    }

    #[tokio::test]
    async fn test_quota_exceeded_leaves_usage_unchanged() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(10, 10)).await;
        std::fs::write(store.base_path().join("existing.mp4"), [0u8; 8]).unwrap();

        let result = store
            .store_bytes("new.mp4", Some("video/mp4"), &[1u8; 5])
            .await;

        assert!(matches!(result, Err(VidstashError::QuotaExceeded { .. })));
        assert_eq!(store.used_bytes().await.unwrap(), 8);
        assert!(!store.base_path().join("new.mp4").exists());
        assert_eq!(staging_entries(&store), 0);
    }

    #[tokio::test]
    async fn test_full_store_rejects_first_chunk() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(100, 100)).await;
        std::fs::write(store.base_path().join("existing.mp4"), [0u8; 100]).unwrap();

        let mut staged = store.stage().await.unwrap();
        let result = staged.write_chunk(&[1u8; 100]).await;

        assert!(matches!(
            result,
            Err(VidstashError::QuotaExceeded { used: 100, .. })
        ));
        assert_eq!(staged.written(), 0);
        drop(staged);
        assert_eq!(staging_entries(&store), 0);
    }

    #[tokio::test]
    async fn test_quota_fit_is_accepted() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(10, 10)).await;
        std::fs::write(store.base_path().join("existing.mp4"), [0u8; 3]).unwrap();

        let receipt = store
            .store_bytes("new.mp4", Some("video/mp4"), &[1u8; 5])
            .await
            .unwrap();

        assert_eq!(receipt.usage.used, 8);
        assert_eq!(receipt.usage.available, 2);
        assert_eq!(store.used_bytes().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_unsupported_type_rejected() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(100, 1000)).await;

        let result = store
            .store_bytes("notes.mp4", Some("text/plain"), b"not a video")
            .await;

        match result {
            Err(VidstashError::UnsupportedType(mime)) => assert_eq!(mime, "text/plain"),
            other => panic!("Expected UnsupportedType, got {other:?}"),
        }
        assert_eq!(store.used_bytes().await.unwrap(), 0);
        assert_eq!(staging_entries(&store), 0);
    }

    #[tokio::test]
    async fn test_file_too_large_rejected_while_streaming() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(4, 1000)).await;

        let result = store
            .store_bytes("big.mp4", Some("video/mp4"), b"12345")
            .await;

        assert!(matches!(
            result,
            Err(VidstashError::FileTooLarge { size: 5, max: 4 })
        ));
        assert_eq!(store.used_bytes().await.unwrap(), 0);
        assert_eq!(staging_entries(&store), 0);
    }

    #[tokio::test]
    async fn test_size_is_checked_before_type() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(4, 4)).await;

        let mut staged = store.stage().await.unwrap();
        staged.write_chunk(b"1234").await.unwrap();
        let mut candidate = staged.finish("a.txt", Some("text/plain")).await.unwrap();
        candidate.size = 5;

        let result = store.accept_upload(candidate).await;

        assert!(matches!(result, Err(VidstashError::FileTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_quota_is_checked_before_type() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(10, 10)).await;
        std::fs::write(store.base_path().join("existing.mp4"), [0u8; 8]).unwrap();

        let result = store
            .store_bytes("notes.txt", Some("text/plain"), &[1u8; 5])
            .await;

        assert!(matches!(result, Err(VidstashError::QuotaExceeded { .. })));
    }

    #[tokio::test]
    async fn test_identical_names_get_distinct_stored_names() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(100, 1000)).await;

        let first = store
            .store_bytes("clip.mp4", Some("video/mp4"), b"first")
            .await
            .unwrap();
        let second = store
            .store_bytes("clip.mp4", Some("video/mp4"), b"second")
            .await
            .unwrap();
        let third = store
            .store_bytes("clip.mp4", Some("video/mp4"), b"third")
            .await
            .unwrap();

        assert_eq!(first.name, "clip.mp4");
        assert_eq!(second.name, "clip-1.mp4");
        assert_eq!(third.name, "clip-2.mp4");
        assert_eq!(
            std::fs::read(store.base_path().join("clip.mp4")).unwrap(),
            b"first"
        );
        assert_eq!(
            std::fs::read(store.base_path().join("clip-1.mp4")).unwrap(),
            b"second"
        );

        let listing = store.list_videos().await.unwrap();
        assert_eq!(listing.videos.len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_uploads_never_overwrite() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(100, 1000)).await;
        let store = std::sync::Arc::new(store);

        let mut handles = Vec::new();
        for i in 0..8u8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .store_bytes("same.mp4", Some("video/mp4"), &[i; 10])
                    .await
            }));
        }

        let mut names = Vec::new();
        for handle in handles {
            names.push(handle.await.unwrap().unwrap().name);
        }
        names.sort();
        names.dedup();

        assert_eq!(names.len(), 8);
        assert_eq!(store.used_bytes().await.unwrap(), 80);
    }

    #[tokio::test]
    async fn test_concurrent_uploads_respect_quota() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(10, 25)).await;
        let store = std::sync::Arc::new(store);

        let mut handles = Vec::new();
        for i in 0..5 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .store_bytes(&format!("clip{i}.mp4"), Some("video/mp4"), &[0u8; 10])
                    .await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(VidstashError::QuotaExceeded { .. }) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(accepted, 2);
        assert_eq!(store.used_bytes().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_unsafe_name_is_sanitized() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(100, 1000)).await;

        let receipt = store
            .store_bytes("../my video (1).mp4", Some("video/mp4"), b"data")
            .await
            .unwrap();

        assert_eq!(receipt.name, "myvideo1.mp4");
        assert!(store.base_path().join("myvideo1.mp4").is_file());
    }

    #[tokio::test]
    async fn test_list_videos_ordered_by_mtime_desc() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(100, 1000)).await;
        for (name, secs) in [("t1.mp4", 1_000), ("t3.mp4", 3_000), ("t2.mp4", 2_000)] {
            let path = store.base_path().join(name);
            std::fs::write(&path, name.as_bytes()).unwrap();
            set_mtime(&path, secs);
        }

        let listing = store.list_videos().await.unwrap();

        let names: Vec<_> = listing.videos.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["t3.mp4", "t2.mp4", "t1.mp4"]);
        assert_eq!(listing.videos[0].modified_at.timestamp(), 3_000);
        assert_eq!(listing.videos[0].url, "/uploads/t3.mp4");
        assert_eq!(listing.videos[0].size, 6);
        assert_eq!(listing.usage.used, 18);
        assert_eq!(listing.usage.available, 982);
    }

    #[tokio::test]
    async fn test_list_videos_skips_staging_area() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(100, 1000)).await;
        let mut staged = store.stage().await.unwrap();
        staged.write_chunk(b"in flight").await.unwrap();

        let listing = store.list_videos().await.unwrap();

        assert!(listing.videos.is_empty());
        assert_eq!(listing.usage.used, 0);
    }

    #[tokio::test]
    async fn test_delete_video() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(100, 1000)).await;
        store
            .store_bytes("a.mp4", Some("video/mp4"), &[0u8; 7])
            .await
            .unwrap();
        store
            .store_bytes("b.mp4", Some("video/mp4"), &[0u8; 3])
            .await
            .unwrap();

        let usage = store.delete_video("a.mp4").await.unwrap();

        assert_eq!(usage, StorageUsage::new(3, 1000));
        assert!(!store.base_path().join("a.mp4").exists());
    }

    #[tokio::test]
    async fn test_delete_missing_video() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(100, 1000)).await;
        std::fs::write(store.base_path().join("keep.mp4"), [0u8; 4]).unwrap();

        let result = store.delete_video("missing.mp4").await;

        assert!(matches!(result, Err(VidstashError::NotFound(_))));
        assert_eq!(store.used_bytes().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_delete_rejects_invalid_names() {
        let (temp_dir, store) = setup_store(QuotaConfig::new(100, 1000)).await;
        let outside = temp_dir.path().join("outside.mp4");
        std::fs::write(&outside, b"x").unwrap();

        for name in ["../outside.mp4", ".staging", "", "a/b.mp4"] {
            let result = store.delete_video(name).await;
            assert!(
                matches!(result, Err(VidstashError::MalformedRequest(_))),
                "{name:?} should be rejected"
            );
        }
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn test_delete_directory_is_not_found() {
        let (_temp_dir, store) = setup_store(QuotaConfig::new(100, 1000)).await;
        std::fs::create_dir(store.base_path().join("folder")).unwrap();

        let result = store.delete_video("folder").await;

        assert!(matches!(result, Err(VidstashError::NotFound(_))));
        assert!(store.base_path().join("folder").is_dir());
    }
}
