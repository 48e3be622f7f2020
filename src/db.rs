use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

use crate::config::MigrateConfig;
use crate::error::MigrateError;

/// Connection settings for the store being migrated. Built from
/// [`MigrateConfig`] and passed in explicitly; nothing here is global.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Acquire connection timeout
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl From<&MigrateConfig> for DbConfig {
    fn from(cfg: &MigrateConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

/// Establishes a connection pool to the target database and verifies it is
/// actually reachable before any step runs.
///
/// # Errors
/// Returns [`MigrateError::Connectivity`] if the store cannot be reached.
pub async fn connect(config: &DbConfig) -> Result<DatabaseConnection, MigrateError> {
    let mut opts = ConnectOptions::new(config.url.clone());
    opts.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .sqlx_logging(false);

    let conn = Database::connect(opts)
        .await
        .map_err(MigrateError::Connectivity)?;
    conn.ping().await.map_err(MigrateError::Connectivity)?;

    info!(backend = ?conn.get_database_backend(), "connected to database");
    Ok(conn)
}
