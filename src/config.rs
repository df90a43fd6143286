//! Configuration module for vidstash.

use serde::Deserialize;
use std::path::Path;

use crate::storage::{QuotaConfig, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_TOTAL_STORAGE};
use crate::{Result, VidstashError};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Video storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the storage directory.
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// URL prefix under which stored files are served.
    #[serde(default = "default_public_path")]
    pub public_path: String,
    /// Maximum size of a single uploaded file in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Maximum aggregate size of all stored files in bytes.
    #[serde(default = "default_max_total_storage")]
    pub max_total_storage_bytes: u64,
}

fn default_storage_path() -> String {
    "uploads".to_string()
}

fn default_public_path() -> String {
    "/uploads".to_string()
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_max_total_storage() -> u64 {
    DEFAULT_MAX_TOTAL_STORAGE
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            public_path: default_public_path(),
            max_file_size_bytes: default_max_file_size(),
            max_total_storage_bytes: default_max_total_storage(),
        }
    }
}

impl StorageConfig {
    /// Quota limits described by this section.
    pub fn quota(&self) -> QuotaConfig {
        QuotaConfig::new(self.max_file_size_bytes, self.max_total_storage_bytes)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty disables file logging.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/vidstash.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve the browser UI from `static_path`.
    #[serde(default)]
    pub serve_static: bool,
    /// Path to static files directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
    /// Upper bound on the duration of a single upload request, in seconds.
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_secs: u64,
}

fn default_static_path() -> String {
    "public".to_string()
}

fn default_upload_timeout() -> u64 {
    3600 // 1 hour, multi-gigabyte uploads over slow links
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            serve_static: false,
            static_path: default_static_path(),
            upload_timeout_secs: default_upload_timeout(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(VidstashError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| VidstashError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `VIDSTASH_PORT`: Override the listen port (ignored if not a valid port)
    /// - `VIDSTASH_STORAGE_PATH`: Override the storage directory
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("VIDSTASH_PORT") {
            if let Ok(port) = port.trim().parse::<u16>() {
                self.server.port = port;
            }
        }

        if let Ok(path) = std::env::var("VIDSTASH_STORAGE_PATH") {
            if !path.is_empty() {
                self.storage.path = path;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - Either quota limit is zero
    /// - The single-file limit exceeds the total storage quota
    /// - The public path is not an absolute URL path distinct from `/` and `/api`
    pub fn validate(&self) -> Result<()> {
        let storage = &self.storage;

        if storage.max_file_size_bytes == 0 || storage.max_total_storage_bytes == 0 {
            return Err(VidstashError::Config(
                "storage quota limits must be greater than zero".to_string(),
            ));
        }

        if storage.max_file_size_bytes > storage.max_total_storage_bytes {
            return Err(VidstashError::Config(format!(
                "max_file_size_bytes ({}) exceeds max_total_storage_bytes ({})",
                storage.max_file_size_bytes, storage.max_total_storage_bytes
            )));
        }

        let public_path = storage.public_path.trim_end_matches('/');
        if !public_path.starts_with('/') || public_path == "/api" || public_path.starts_with("/api/") {
            return Err(VidstashError::Config(format!(
                "public_path must start with '/' and must not be '/' or under '/api': {:?}",
                storage.public_path
            )));
        }

        if storage.path.trim().is_empty() {
            return Err(VidstashError::Config(
                "storage path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
