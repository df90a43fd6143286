//! Request DTOs for Web API.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Action value that turns `GET /api/upload` into a storage query.
pub const STORAGE_INFO_ACTION: &str = "getStorageInfo";

/// Query parameters accepted by `GET /api/upload`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StorageInfoQuery {
    /// Must be `getStorageInfo`.
    #[serde(default)]
    pub action: Option<String>,
}

impl StorageInfoQuery {
    /// Whether the query asks for storage information.
    pub fn is_storage_info(&self) -> bool {
        self.action.as_deref() == Some(STORAGE_INFO_ACTION)
    }
}

/// Upload form (multipart/form-data).
///
/// Only used to document the request body; the handler streams the field.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadForm {
    /// The video file. `file` is accepted as an alias.
    #[schema(value_type = String, format = Binary)]
    pub video_file: Vec<u8>,
}
