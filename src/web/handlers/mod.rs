//! API handlers.

pub mod video;

pub use video::*;

use crate::storage::VideoStore;

/// Application state shared across handlers.
pub struct AppState {
    /// The video store.
    pub store: VideoStore,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: VideoStore) -> Self {
        Self { store }
    }
}
