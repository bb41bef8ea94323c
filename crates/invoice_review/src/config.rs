use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use invoice_review_core::storage::{resolve_path, StoreLocation};
use thiserror::Error;

/// Default embedded store used when the primary is unreachable.
const DEFAULT_FALLBACK_SQLITE_PATH: &str = "data/invoice_review_fallback.db";

/// Default origins of the local frontend dev server.
const DEFAULT_CORS_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

/// Startup-time configuration failures. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is not set. Add it to the environment or a .env file")]
    MissingStoreLocation,
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("Cannot determine backend root directory: {0}")]
    BackendRoot(#[from] std::io::Error),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Primary or embedded store, from `DATABASE_URL`.
    pub store: StoreLocation,
    /// Embedded store used on automatic failover (resolved path).
    pub fallback_sqlite_path: PathBuf,
    /// Base directory for relative SQLite paths.
    pub backend_root: PathBuf,
    /// Primary connect timeout in seconds (default: 5)
    pub connect_timeout_seconds: u64,
    /// SQLite busy timeout in milliseconds (default: 5,000)
    pub sqlite_busy_timeout_ms: u64,
    /// Handwriting recognition endpoint. Uploads fail when unset.
    pub recognizer_url: Option<String>,
    /// Origins allowed by CORS.
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - Store location (required). `sqlite:` selects the embedded store
    /// - `FALLBACK_SQLITE_PATH` - Fallback file (default: "data/invoice_review_fallback.db")
    /// - `BACKEND_ROOT` - Base for relative SQLite paths (default: working directory)
    /// - `CONNECT_TIMEOUT_SECONDS` - Primary connect timeout (default: 5)
    /// - `SQLITE_BUSY_TIMEOUT_MS` - SQLite busy timeout (default: 5000)
    /// - `RECOGNIZER_URL` - Handwriting recognition endpoint (optional)
    /// - `CORS_ALLOWED_ORIGINS` - Comma-separated origins (default: local Vite dev server)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_root = match lookup("BACKEND_ROOT").filter(|v| !v.trim().is_empty()) {
            Some(root) => PathBuf::from(root),
            None => env::current_dir()?,
        };

        let store = lookup("DATABASE_URL")
            .and_then(|raw| StoreLocation::parse(&raw, &backend_root))
            .ok_or(ConfigError::MissingStoreLocation)?;

        let fallback = lookup("FALLBACK_SQLITE_PATH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FALLBACK_SQLITE_PATH.to_string());
        let fallback_sqlite_path = resolve_path(Path::new(&fallback), &backend_root);

        Ok(Self {
            store,
            fallback_sqlite_path,
            backend_root,
            connect_timeout_seconds: lookup("CONNECT_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            sqlite_busy_timeout_ms: lookup("SQLITE_BUSY_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5_000),
            recognizer_url: lookup("RECOGNIZER_URL").filter(|v| !v.trim().is_empty()),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGINS.to_string())
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
        })
    }

    /// Get the primary connect timeout as a Duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get the SQLite busy timeout as a Duration.
    pub fn sqlite_busy_timeout(&self) -> Duration {
        Duration::from_millis(self.sqlite_busy_timeout_ms)
    }
}
