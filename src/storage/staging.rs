//! In-flight uploads.
//!
//! Upload bytes are streamed into a private temporary file inside the
//! staging directory. The temporary file is deleted when dropped, so an
//! aborted or rejected upload never leaves a partial file behind.

use std::path::Path;

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::policy::{resolve_mime, QuotaConfig};
use crate::{Result, VidstashError};

/// An upload whose bytes are still arriving.
#[derive(Debug)]
pub struct StagedUpload {
    file: File,
    path: TempPath,
    written: u64,
    used_at_start: u64,
    quota: QuotaConfig,
}

impl StagedUpload {
    /// Create a new staging file inside `staging_dir`.
    ///
    /// `used` is the storage usage when the upload starts; the upload is cut
    /// off once it can no longer fit the remaining quota.
    pub(crate) fn create(staging_dir: &Path, quota: QuotaConfig, used: u64) -> Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix(".upload-")
            .suffix(".part")
            .tempfile_in(staging_dir)
            .map_err(|e| VidstashError::WriteFailed(format!("cannot create staging file: {e}")))?;
        let (file, path) = temp.into_parts();

        Ok(Self {
            file: File::from_std(file),
            path,
            written: 0,
            used_at_start: used,
            quota,
        })
    }

    /// Append a chunk.
    ///
    /// Fails with `FileTooLarge` as soon as the upload grows past the
    /// single-file limit, then with `QuotaExceeded` once it no longer fits
    /// the quota left when staging began. Nothing of the offending chunk is
    /// written.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let written = self.written.saturating_add(chunk.len() as u64);
        self.quota.check_file_size(written)?;
        self.quota.check_quota(self.used_at_start, written)?;

        self.file
            .write_all(chunk)
            .await
            .map_err(|e| VidstashError::WriteFailed(e.to_string()))?;
        self.written = written;
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush the staged bytes to disk and describe the candidate file.
    ///
    /// `declared_mime` is the type the client sent with the part, if any.
    pub async fn finish(
        self,
        original_name: impl Into<String>,
        declared_mime: Option<&str>,
    ) -> Result<UploadCandidate> {
        let Self {
            mut file,
            path,
            written,
            ..
        } = self;

        file.flush()
            .await
            .map_err(|e| VidstashError::WriteFailed(e.to_string()))?;
        file.sync_all()
            .await
            .map_err(|e| VidstashError::WriteFailed(e.to_string()))?;
        drop(file);

        let original_name = original_name.into();
        let mime = resolve_mime(declared_mime, &original_name);

        Ok(UploadCandidate {
            temp: path,
            original_name,
            size: written,
            mime,
        })
    }
}

/// A fully received upload awaiting acceptance.
#[derive(Debug)]
pub struct UploadCandidate {
    pub(crate) temp: TempPath,
    /// File name as sent by the client.
    pub original_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Resolved MIME type (see [`resolve_mime`]).
    pub mime: String,
}

impl UploadCandidate {
    /// Location of the staged bytes.
    pub fn staged_path(&self) -> &Path {
        &self.temp
    }
}
