//! Postgres connection pool and schema wiring.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::StoreError;

const SCHEMA: &str = include_str!("../migrations/0001_storefront.sql");

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(database_url)
        .await?;
    info!(max_connections, "connected to postgres");
    Ok(pool)
}

/// Create tables and indexes if missing. Idempotent.
pub async fn apply_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    info!("storefront schema applied");
    Ok(())
}
