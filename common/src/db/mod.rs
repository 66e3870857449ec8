use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::error::{Error, Result};

pub mod models;

/// Database pool type
pub type DbPool = Pool<Postgres>;

/// Open a connection pool and verify the storage engine is reachable
///
/// Any failure while establishing the first connection (including rejected
/// credentials) is reported as `Error::Connection`.
pub async fn connect_pool(
    options: PgConnectOptions,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<DbPool> {
    info!(
        "Connecting to PostgreSQL at {}:{} with pool size: {}",
        options.get_host(),
        options.get_port(),
        max_connections
    );

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await
        .map_err(|e| Error::Connection(e.to_string()))?;

    info!("Connected to PostgreSQL database");
    Ok(pool)
}
