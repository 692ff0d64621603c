//! Database pool setup

use std::time::Duration;
use sqlx::{Pool, Postgres};
use crate::config::DatabaseConfig;
use crate::utils::errors::DownMateError;

pub type DatabasePool = Pool<Postgres>;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Create the connection pool from the `[database]` settings section
/// and verify it with a round trip.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, DownMateError> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database connection pool created"
    );
    Ok(pool)
}

/// Apply pending migrations at startup
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DownMateError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await?;

    tracing::info!("Database migrations applied");
    Ok(())
}
