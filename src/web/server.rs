//! Web server for vidstash.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{Config, StorageConfig, WebConfig};
use crate::storage::VideoStore;
use crate::{Result, VidstashError};

use super::handlers::AppState;
use super::router::{
    create_files_router, create_health_router, create_router, create_static_router,
};

/// Web server for the API and stored files.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Web configuration.
    web_config: WebConfig,
    /// Storage configuration.
    storage_config: StorageConfig,
}

impl WebServer {
    /// Create a new web server, opening the video store.
    pub async fn new(config: &Config) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| {
                VidstashError::Config(format!(
                    "invalid listen address {}:{}: {}",
                    config.server.host, config.server.port, e
                ))
            })?;

        let store = VideoStore::open(
            &config.storage.path,
            &config.storage.public_path,
            config.storage.quota(),
        )
        .await?;
        tracing::info!("Video storage initialized at: {}", config.storage.path);

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(store)),
            web_config: config.web.clone(),
            storage_config: config.storage.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the video store.
    pub fn store(&self) -> &VideoStore {
        &self.app_state.store
    }

    /// Build the complete application router.
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.app_state.clone(), &self.web_config)
            .merge(create_health_router())
            .merge(
                create_files_router(&self.storage_config.public_path, self.store().base_path())
                    .layer(TraceLayer::new_for_http()),
            );

        // Add static file serving if enabled
        if self.web_config.serve_static {
            if let Some(static_router) = create_static_router(&self.web_config.static_path) {
                router = router.merge(static_router);
            }
        }

        router
    }

    /// Run the web server.
    pub async fn run(self) -> std::io::Result<()> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
