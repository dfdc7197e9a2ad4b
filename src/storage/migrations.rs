//! Embedded schema migrations.
//!
//! Migration files are compiled into the binary with `include_str!` and
//! applied in filename order, one transaction per file. Applied versions
//! are recorded in `_innkeep_migrations` so later startups skip them.

use crate::errors::{InnkeepError, Result};
use crate::storage::DbPool;
use sqlx::Row;
use tracing::{error, info};

/// Migrations in apply order. The numeric filename prefix is the version.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250301000001_create_users",
        include_str!("../../migrations/20250301000001_create_users.sql"),
    ),
    (
        "20250301000002_create_organizations",
        include_str!("../../migrations/20250301000002_create_organizations.sql"),
    ),
    (
        "20250301000003_create_sessions",
        include_str!("../../migrations/20250301000003_create_sessions.sql"),
    ),
    (
        "20250301000004_create_invitations",
        include_str!("../../migrations/20250301000004_create_invitations.sql"),
    ),
    (
        "20250301000005_create_properties",
        include_str!("../../migrations/20250301000005_create_properties.sql"),
    ),
    (
        "20250301000006_create_reservations",
        include_str!("../../migrations/20250301000006_create_reservations.sql"),
    ),
];

/// Bring the schema up to date, applying whatever is still pending.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    ensure_tracking_table(pool).await?;
    let applied = applied_versions(pool).await?;

    let mut pending = Vec::new();
    for (filename, sql) in MIGRATIONS {
        let version = version_of(filename)?;
        if !applied.contains(&version) {
            pending.push((version, *filename, *sql));
        }
    }

    if pending.is_empty() {
        info!("Schema is up to date");
        return Ok(());
    }

    info!(count = pending.len(), "Applying pending migrations");
    for (version, filename, sql) in pending {
        apply_migration(pool, version, filename, sql).await?;
    }

    info!("Schema migrations finished");
    Ok(())
}

async fn apply_migration(pool: &DbPool, version: i64, filename: &str, sql: &str) -> Result<()> {
    let started = std::time::Instant::now();

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| InnkeepError::database(e, "begin migration transaction"))?;

    // raw_sql so multi-statement migration files run in one shot
    sqlx::raw_sql(sql).execute(&mut *tx).await.map_err(|e| {
        error!(error = %e, migration = filename, "Migration failed");
        InnkeepError::database(e, format!("apply migration {}", filename))
    })?;

    let elapsed_ms = started.elapsed().as_millis() as i64;
    sqlx::query(
        "INSERT INTO _innkeep_migrations (version, description, checksum, execution_time, installed_on) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(version)
    .bind(filename)
    .bind(checksum_of(sql))
    .bind(elapsed_ms)
    .bind(chrono::Utc::now())
    .execute(&mut *tx)
    .await
    .map_err(|e| InnkeepError::database(e, format!("record migration {}", filename)))?;

    tx.commit()
        .await
        .map_err(|e| InnkeepError::database(e, "commit migration transaction"))?;

    info!(version, elapsed_ms, "Applied migration {}", filename);
    Ok(())
}

async fn ensure_tracking_table(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _innkeep_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            checksum BLOB NOT NULL,
            execution_time INTEGER NOT NULL,
            installed_on TEXT NOT NULL
        )
    "#,
    )
    .execute(pool)
    .await
    .map_err(|e| InnkeepError::database(e, "create migration tracking table"))?;

    Ok(())
}

async fn applied_versions(pool: &DbPool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM _innkeep_migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .map_err(|e| InnkeepError::database(e, "read applied migration versions"))?;

    Ok(rows.into_iter().map(|row| row.get::<i64, _>("version")).collect())
}

fn version_of(filename: &str) -> Result<i64> {
    let prefix = filename.split('_').next().unwrap_or_default();
    prefix.parse().map_err(|_| {
        InnkeepError::validation(format!("Migration filename needs a numeric prefix: {}", filename))
    })
}

fn checksum_of(sql: &str) -> Vec<u8> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    sql.hash(&mut hasher);
    hasher.finish().to_le_bytes().to_vec()
}
