//! Postgres-backed product repository.
//!
//! Every mutating operation opens its own transaction, acts, then commits. Any
//! failure before the commit rolls the transaction back explicitly before the
//! error is returned.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `DataValidationError::Store` with the failing
//! operation name. Well-known PostgreSQL codes get a readable label:
//!
//! | PostgreSQL Error Code | Label |
//! |----------------------|-------|
//! | `23502` | not-null violation |
//! | `23505` | unique violation |
//! | `23514` | check violation |
//! | `22001` | value too long |
//! | `22003` | numeric overflow |
//!
//! ## Thread Safety
//!
//! `PostgresProductRepository` is `Send + Sync` and cheap to clone; the pool
//! handles connection management.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{Span, instrument};

use stockroom_core::{DataValidationError, ProductId, ValidationResult};
use stockroom_products::{Category, PriceInput, Product};

use super::r#trait::{ProductRepository, missing_row, require_id};

const SELECT_PRODUCTS: &str =
    "SELECT id, name, description, price, available, category FROM products";

/// Postgres-backed product repository.
///
/// The pool is supplied by the caller (see [`crate::db::connect`]); this type
/// never opens or owns store configuration itself.
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: Arc<PgPool>,
}

impl PostgresProductRepository {
    /// Create a repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    async fn begin(&self) -> ValidationResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))
    }

    /// Run a single-row write inside its own transaction.
    ///
    /// Zero affected rows means the id no longer exists; `verb` names the
    /// caller-facing operation in that error.
    async fn write_row(
        &self,
        operation: &'static str,
        verb: &'static str,
        id: ProductId,
        query: Query<'_, Postgres, PgArguments>,
    ) -> ValidationResult<()> {
        let mut tx = self.begin().await?;

        let affected = match query.execute(&mut *tx).await {
            Ok(result) => result.rows_affected(),
            Err(e) => {
                rollback(tx, operation).await;
                return Err(map_sqlx_error(operation, e));
            }
        };

        if affected == 0 {
            rollback(tx, operation).await;
            return Err(missing_row(verb, id));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    async fn select_where(
        &self,
        operation: &'static str,
        query: Query<'_, Postgres, PgArguments>,
    ) -> ValidationResult<Vec<Product>> {
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        let products = rows
            .iter()
            .map(product_from_row)
            .collect::<ValidationResult<Vec<_>>>()?;

        Span::current().record("row_count", products.len());
        Ok(products)
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip(self, product), fields(name = %product.name, id), err)]
    async fn create(&self, product: &mut Product) -> ValidationResult<()> {
        product.validate()?;
        let mut tx = self.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO products (name, description, price, available, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.available)
        .bind(product.category.as_str())
        .fetch_one(&mut *tx)
        .await
        .and_then(|row| row.try_get::<i64, _>("id"));

        let id = match inserted {
            Ok(id) => id,
            Err(e) => {
                rollback(tx, "insert_product").await;
                return Err(map_sqlx_error("insert_product", e));
            }
        };

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("id", id);
        tracing::debug!(id, "product created");
        product.id = Some(ProductId::new(id));
        Ok(())
    }

    #[instrument(skip(self, product), fields(id = ?product.id), err)]
    async fn update(&self, product: &Product) -> ValidationResult<()> {
        let id = require_id(product, "Update")?;
        product.validate()?;

        let query = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, available = $5, category = $6
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.available)
        .bind(product.category.as_str());

        self.write_row("update_product", "Update", id, query).await
    }

    #[instrument(skip(self, product), fields(id = ?product.id), err)]
    async fn delete(&self, product: Product) -> ValidationResult<()> {
        let id = require_id(&product, "Delete")?;
        let query = sqlx::query("DELETE FROM products WHERE id = $1").bind(id.get());
        self.write_row("delete_product", "Delete", id, query).await
    }

    #[instrument(skip(self), fields(row_count), err)]
    async fn all(&self) -> ValidationResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCTS} ORDER BY id");
        self.select_where("all_products", sqlx::query(&sql)).await
    }

    #[instrument(skip(self), err)]
    async fn find(&self, id: ProductId) -> ValidationResult<Option<Product>> {
        let sql = format!("{SELECT_PRODUCTS} WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), fields(row_count), err)]
    async fn find_by_name(&self, name: &str) -> ValidationResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCTS} WHERE name = $1 ORDER BY id");
        self.select_where("find_by_name", sqlx::query(&sql).bind(name))
            .await
    }

    #[instrument(skip(self), fields(row_count), err)]
    async fn find_by_availability(&self, available: bool) -> ValidationResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCTS} WHERE available = $1 ORDER BY id");
        self.select_where("find_by_availability", sqlx::query(&sql).bind(available))
            .await
    }

    #[instrument(skip(self), fields(row_count), err)]
    async fn find_by_category(&self, category: Category) -> ValidationResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCTS} WHERE category = $1 ORDER BY id");
        self.select_where(
            "find_by_category",
            sqlx::query(&sql).bind(category.as_str()),
        )
        .await
    }

    #[instrument(skip(self), fields(row_count), err)]
    async fn find_by_price(&self, price: PriceInput) -> ValidationResult<Vec<Product>> {
        let price: Decimal = price.to_decimal()?;
        let sql = format!("{SELECT_PRODUCTS} WHERE price = $1 ORDER BY id");
        self.select_where("find_by_price", sqlx::query(&sql).bind(price))
            .await
    }
}

/// Roll back, logging (not returning) a failed rollback so the original error wins.
async fn rollback(tx: Transaction<'static, Postgres>, operation: &str) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(operation, error = %e, "rollback failed");
    }
}

fn product_from_row(row: &PgRow) -> ValidationResult<Product> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode_product", e);

    let category: String = row.try_get("category").map_err(decode)?;
    let category = category.parse::<Category>().map_err(|e| {
        DataValidationError::store("decode_product", format!("stored category: {e}"))
    })?;

    Ok(Product {
        id: Some(ProductId::new(row.try_get("id").map_err(decode)?)),
        name: row.try_get("name").map_err(decode)?,
        description: row.try_get("description").map_err(decode)?,
        price: row.try_get("price").map_err(decode)?,
        available: row.try_get("available").map_err(decode)?,
        category,
    })
}

/// Map SQLx errors to `DataValidationError::Store`.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DataValidationError {
    match err {
        sqlx::Error::Database(db_err) => {
            let label = match db_err.code().as_deref() {
                Some("23502") => "not-null violation",
                Some("23505") => "unique violation",
                Some("23514") => "check violation",
                Some("22001") => "value too long",
                Some("22003") => "numeric overflow",
                _ => "database error",
            };
            DataValidationError::store(operation, format!("{label}: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => DataValidationError::store(operation, "connection pool closed"),
        sqlx::Error::PoolTimedOut => {
            DataValidationError::store(operation, "timed out acquiring a connection")
        }
        sqlx::Error::RowNotFound => DataValidationError::store(operation, "unexpected row not found"),
        other => DataValidationError::store(operation, other.to_string()),
    }
}
