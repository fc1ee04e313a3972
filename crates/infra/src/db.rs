//! Postgres connection and table bootstrap.
//!
//! Binding happens once at process start: build a [`StoreConfig`], [`connect`],
//! then [`init_schema`]. The resulting pool is handed to
//! [`PostgresProductRepository`](crate::repository::PostgresProductRepository).

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

use stockroom_core::ValidationResult;

use crate::config::StoreConfig;
use crate::repository::map_sqlx_error;

const CREATE_PRODUCTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id          BIGSERIAL PRIMARY KEY,
        name        VARCHAR(100) NOT NULL,
        description VARCHAR(250) NOT NULL,
        price       NUMERIC(14, 2) NOT NULL,
        available   BOOLEAN NOT NULL DEFAULT TRUE,
        category    VARCHAR(32) NOT NULL DEFAULT 'UNKNOWN'
    )
"#;

/// Open a connection pool to the configured store.
#[instrument(skip(config), fields(max_connections = config.max_connections), err)]
pub async fn connect(config: &StoreConfig) -> ValidationResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_uri)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Create the `products` table if it does not exist yet.
#[instrument(skip(pool), err)]
pub async fn init_schema(pool: &PgPool) -> ValidationResult<()> {
    sqlx::query(CREATE_PRODUCTS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("init_schema", e))?;
    Ok(())
}

/// Remove every product row (used to reset state between test runs).
#[instrument(skip(pool), err)]
pub async fn clear_products(pool: &PgPool) -> ValidationResult<u64> {
    let result = sqlx::query("DELETE FROM products")
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("clear_products", e))?;
    Ok(result.rows_affected())
}
