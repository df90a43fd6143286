//! Response DTOs for Web API.
//!
//! Field names are camelCase on the wire (`fileName`, `totalSize`,
//! `availableSpace`), matching what the upload page expects.

use serde::Serialize;
use utoipa::ToSchema;

use crate::storage::{format_size, Listing, QuotaConfig, StorageUsage, StoredVideo, UploadReceipt};

/// Successful upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Stored file name.
    pub file_name: String,
    /// Stored size in bytes.
    pub size: u64,
    /// Public URL of the file.
    pub url: String,
    /// Bytes used after the upload.
    pub total_size: u64,
    /// Bytes left before the quota is reached.
    pub available_space: u64,
}

impl From<UploadReceipt> for UploadResponse {
    fn from(receipt: UploadReceipt) -> Self {
        Self {
            success: true,
            message: format!(
                "Uploaded {} ({})",
                receipt.name,
                format_size(receipt.size)
            ),
            file_name: receipt.name,
            size: receipt.size,
            url: receipt.url,
            total_size: receipt.usage.used,
            available_space: receipt.usage.available,
        }
    }
}

/// One stored video in a listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct VideoEntry {
    /// Stored file name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Modification time, milliseconds since the Unix epoch.
    pub time: i64,
    /// Public URL of the file.
    pub url: String,
}

impl From<StoredVideo> for VideoEntry {
    fn from(video: StoredVideo) -> Self {
        Self {
            name: video.name,
            size: video.size,
            time: video.modified_at.timestamp_millis(),
            url: video.url,
        }
    }
}

/// Listing of stored videos, most recent first.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
    /// Always `true`.
    pub success: bool,
    /// Stored videos.
    pub videos: Vec<VideoEntry>,
    /// Bytes used.
    pub total_size: u64,
    /// Bytes left before the quota is reached.
    pub available_space: u64,
}

impl From<Listing> for VideoListResponse {
    fn from(listing: Listing) -> Self {
        Self {
            success: true,
            videos: listing.videos.into_iter().map(VideoEntry::from).collect(),
            total_size: listing.usage.used,
            available_space: listing.usage.available,
        }
    }
}

/// Successful deletion.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    /// Always `true`.
    pub success: bool,
    /// Bytes used after the deletion.
    pub total_size: u64,
    /// Bytes left before the quota is reached.
    pub available_space: u64,
}

impl From<StorageUsage> for DeleteResponse {
    fn from(usage: StorageUsage) -> Self {
        Self {
            success: true,
            total_size: usage.used,
            available_space: usage.available,
        }
    }
}

/// Answer to `GET /api/upload?action=getStorageInfo`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StorageInfoResponse {
    /// Always `true`.
    pub success: bool,
    /// Bytes used.
    pub used: u64,
}

/// Storage usage together with the configured limits.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageDetailsResponse {
    /// Always `true`.
    pub success: bool,
    /// Bytes used.
    pub used: u64,
    /// Bytes left before the quota is reached.
    pub available: u64,
    /// Single-file limit in bytes.
    pub max_file_size: u64,
    /// Total quota in bytes.
    pub max_total_storage: u64,
}

impl StorageDetailsResponse {
    /// Build from current usage and the quota it was measured against.
    pub fn new(usage: StorageUsage, quota: QuotaConfig) -> Self {
        Self {
            success: true,
            used: usage.used,
            available: usage.available,
            max_file_size: quota.max_file_size,
            max_total_storage: quota.max_total_storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_upload_response_json() {
        let response = UploadResponse::from(UploadReceipt {
            name: "clip.mp4".to_string(),
            size: 1536,
            url: "/uploads/clip.mp4".to_string(),
            usage: StorageUsage::new(2048, 10_000),
        });

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": true,
                "message": "Uploaded clip.mp4 (1.5 KB)",
                "fileName": "clip.mp4",
                "size": 1536,
                "url": "/uploads/clip.mp4",
                "totalSize": 2048,
                "availableSpace": 7952
            })
        );
    }

    #[test]
    fn test_video_list_response_json() {
        let listing = Listing {
            videos: vec![StoredVideo {
                name: "a.mp4".to_string(),
                size: 3,
                modified_at: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
                url: "/uploads/a.mp4".to_string(),
            }],
            usage: StorageUsage::new(3, 10),
        };

        assert_eq!(
            serde_json::to_value(VideoListResponse::from(listing)).unwrap(),
            json!({
                "success": true,
                "videos": [
                    {"name": "a.mp4", "size": 3, "time": 1_700_000_000_123i64, "url": "/uploads/a.mp4"}
                ],
                "totalSize": 3,
                "availableSpace": 7
            })
        );
    }

    #[test]
    fn test_storage_details_json() {
        let details =
            StorageDetailsResponse::new(StorageUsage::new(4, 10), QuotaConfig::new(5, 10));

        assert_eq!(
            serde_json::to_value(details).unwrap(),
            json!({
                "success": true,
                "used": 4,
                "available": 6,
                "maxFileSize": 5,
                "maxTotalStorage": 10
            })
        );
    }
}
