//! SQLite connection pool construction.
//!
//! The server and the seed binary share this entry point. Connections open
//! in WAL mode with a busy timeout so concurrent handlers queue on the
//! single writer instead of surfacing SQLITE_BUSY to callers.

use crate::config::DatabaseConfig;
use crate::errors::{InnkeepError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

pub type DbPool = Pool<Sqlite>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a pool against the configured database, creating the file on first
/// run. Applies pending migrations afterwards when `auto_migrate` is set.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    check_pool_config(config)?;

    let connect = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| InnkeepError::Database {
            source: e,
            context: format!("Unusable SQLite connection string: {}", config.url),
        })?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);

    let mut builder = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout())
        .test_before_acquire(true);
    if let Some(idle) = config.idle_timeout() {
        builder = builder.idle_timeout(idle);
    }

    let pool = builder.connect_with(connect).await.map_err(|e| {
        tracing::error!(error = %e, url = %config.url, "SQLite pool construction failed");
        InnkeepError::Database {
            source: e,
            context: format!("Failed to connect to database: {}", config.url),
        }
    })?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        acquire_timeout_ms = config.connect_timeout().as_millis(),
        "Database pool ready"
    );

    if config.auto_migrate {
        crate::storage::migrations::run_migrations(&pool).await?;
    }

    Ok(pool)
}

/// Bounds that the validator derive on [`DatabaseConfig`] cannot express
/// because they relate two fields.
fn check_pool_config(config: &DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(InnkeepError::validation("database URL is empty"));
    }
    if !config.url.starts_with("sqlite:") {
        return Err(InnkeepError::validation("only sqlite URLs are supported"));
    }
    if config.max_connections == 0 {
        return Err(InnkeepError::validation("max_connections must be at least 1"));
    }
    if config.min_connections > config.max_connections {
        return Err(InnkeepError::validation(
            "min_connections cannot exceed max_connections",
        ));
    }
    Ok(())
}
