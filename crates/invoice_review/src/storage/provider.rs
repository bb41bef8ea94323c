//! Connection acquisition with automatic failover.
//!
//! Every logical operation acquires a fresh [`Connection`]. In automatic mode
//! the primary is tried first and the embedded store takes over when the
//! primary cannot be reached. The descriptor of the store that answered
//! travels with the connection.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use invoice_review_core::storage::{
    ActiveBackend, RepositoryError, Result, StoreLocation, SubmissionRepository,
};

use super::postgres::{is_connection_error, PostgresRepository};
use super::sqlite::SqliteRepository;
use crate::config::{Config, ConfigError};

/// An open repository plus the descriptor of the store behind it.
///
/// Dropping the connection closes it.
pub struct Connection {
    repo: Box<dyn SubmissionRepository>,
    backend: ActiveBackend,
}

impl Connection {
    pub fn new(repo: Box<dyn SubmissionRepository>, backend: ActiveBackend) -> Self {
        Self { repo, backend }
    }

    pub fn repo(&self) -> &dyn SubmissionRepository {
        self.repo.as_ref()
    }

    pub fn backend(&self) -> &ActiveBackend {
        &self.backend
    }
}

/// Source of connections.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn acquire(&self) -> Result<Connection>;
}

enum Target {
    Primary(PgConnectOptions),
    Embedded(PathBuf),
}

/// Opens connections according to the configured store location.
pub struct ConnectionProvider {
    target: Target,
    fallback_path: PathBuf,
    connect_timeout: Duration,
    busy_timeout: Duration,
}

impl ConnectionProvider {
    /// Builds a provider from configuration.
    ///
    /// `sslmode=require` is applied unless the URL chooses a mode itself.
    pub fn new(config: &Config) -> std::result::Result<Self, ConfigError> {
        let target = match &config.store {
            StoreLocation::Embedded(path) => Target::Embedded(path.clone()),
            StoreLocation::Network(url) => {
                let options =
                    PgConnectOptions::from_str(url).map_err(|e| ConfigError::InvalidValue {
                        key: "DATABASE_URL",
                        message: e.to_string(),
                    })?;
                let options = if url.contains("sslmode=") {
                    options
                } else {
                    options.ssl_mode(PgSslMode::Require)
                };
                Target::Primary(options)
            }
        };

        Ok(Self {
            target,
            fallback_path: config.fallback_sqlite_path.clone(),
            connect_timeout: config.connect_timeout(),
            busy_timeout: config.sqlite_busy_timeout(),
        })
    }

    /// Applies the primary schema. A no-op for an explicit embedded store,
    /// whose schema is applied on open.
    pub async fn migrate_primary(&self) -> Result<()> {
        let Target::Primary(options) = &self.target else {
            tracing::info!("Embedded store configured, nothing to migrate");
            return Ok(());
        };

        let repo = PostgresRepository::connect(options, self.connect_timeout)
            .await
            .map_err(connect_error)?;
        repo.migrate().await
    }

    async fn open_embedded(&self, path: &Path, backend: ActiveBackend) -> Result<Connection> {
        let repo = SqliteRepository::open(path, self.busy_timeout).await?;
        Ok(Connection::new(Box::new(repo), backend))
    }
}

fn connect_error(err: sqlx::Error) -> RepositoryError {
    if is_connection_error(&err) {
        RepositoryError::ConnectionFailed(err.to_string())
    } else {
        RepositoryError::QueryFailed(format!("Cannot connect to primary store: {err}"))
    }
}

#[async_trait]
impl Connector for ConnectionProvider {
    async fn acquire(&self) -> Result<Connection> {
        let options = match &self.target {
            Target::Embedded(path) => {
                let backend = ActiveBackend::explicit_embedded(&path.display().to_string());
                return self.open_embedded(path, backend).await;
            }
            Target::Primary(options) => options,
        };

        match PostgresRepository::connect(options, self.connect_timeout).await {
            Ok(repo) => Ok(Connection::new(Box::new(repo), ActiveBackend::primary())),
            Err(e) if is_connection_error(&e) => {
                tracing::warn!(
                    error = %e,
                    fallback = %self.fallback_path.display(),
                    "Primary store unreachable, using embedded fallback"
                );
                let backend = ActiveBackend::failover(&e.to_string());
                self.open_embedded(&self.fallback_path, backend).await
            }
            Err(e) => Err(connect_error(e)),
        }
    }
}
