//! Middleware for Web API.

pub mod cors;
pub mod hidden;
pub mod timeout;

pub use cors::create_cors_layer;
pub use hidden::reject_hidden_paths;
pub use timeout::handle_timeout_error;
