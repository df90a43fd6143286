//! vidstash - a small video upload server.
//!
//! Uploads are streamed to a staging area, checked against a per-file limit,
//! a total storage quota and a video MIME policy, then moved into a flat
//! storage directory under a collision-free name.

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod web;

pub use config::Config;
pub use error::{Result, VidstashError};
pub use storage::{
    format_size, Listing, QuotaConfig, StorageUsage, StoredVideo, UploadReceipt, VideoStore,
};
pub use web::WebServer;
