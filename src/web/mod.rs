//! Web API module for vidstash.
//!
//! This module provides the REST API used by the upload page, static access
//! to stored videos and the OpenAPI document.

pub mod api_doc;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use api_doc::ApiDoc;
pub use error::{ApiError, ErrorCode};
pub use router::create_router;
pub use server::WebServer;
