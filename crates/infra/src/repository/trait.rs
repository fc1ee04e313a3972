use std::sync::Arc;

use async_trait::async_trait;

use stockroom_core::{DataValidationError, ProductId, ValidationResult};
use stockroom_products::{Category, PriceInput, Product};

/// CRUD and query operations over products.
///
/// ## Identity
///
/// - `create()` ignores any id already on the product and writes back the id
///   assigned by the store.
/// - `update()` and `delete()` require an id; calling them on an unpersisted
///   product is a caller error reported as a [`DataValidationError`].
/// - `delete()` consumes the product: once its row is gone the value is
///   detached and cannot be updated or deleted again.
///
/// ## Queries
///
/// Queries hit the store every time and return materialized rows ordered by id.
/// Filters are exact matches (`find_by_name` is case-sensitive). `find_by_price`
/// compares numerically, so `"12.5"`, `"12.50"` and `Decimal 12.50` match the
/// same rows.
///
/// ## Failures
///
/// Store failures roll back the current transaction and surface as
/// [`DataValidationError::Store`]; they are never retried.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new row and assign its id to `product`.
    async fn create(&self, product: &mut Product) -> ValidationResult<()>;

    /// Persist the current field values of an already-identified product.
    async fn update(&self, product: &Product) -> ValidationResult<()>;

    /// Remove the product's row.
    async fn delete(&self, product: Product) -> ValidationResult<()>;

    /// Every product.
    async fn all(&self) -> ValidationResult<Vec<Product>>;

    /// Lookup by primary key.
    async fn find(&self, id: ProductId) -> ValidationResult<Option<Product>>;

    async fn find_by_name(&self, name: &str) -> ValidationResult<Vec<Product>>;

    async fn find_by_availability(&self, available: bool) -> ValidationResult<Vec<Product>>;

    async fn find_by_category(&self, category: Category) -> ValidationResult<Vec<Product>>;

    /// Products whose price equals `price` after exact-decimal normalization.
    async fn find_by_price(&self, price: PriceInput) -> ValidationResult<Vec<Product>>;
}

#[async_trait]
impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    async fn create(&self, product: &mut Product) -> ValidationResult<()> {
        (**self).create(product).await
    }

    async fn update(&self, product: &Product) -> ValidationResult<()> {
        (**self).update(product).await
    }

    async fn delete(&self, product: Product) -> ValidationResult<()> {
        (**self).delete(product).await
    }

    async fn all(&self) -> ValidationResult<Vec<Product>> {
        (**self).all().await
    }

    async fn find(&self, id: ProductId) -> ValidationResult<Option<Product>> {
        (**self).find(id).await
    }

    async fn find_by_name(&self, name: &str) -> ValidationResult<Vec<Product>> {
        (**self).find_by_name(name).await
    }

    async fn find_by_availability(&self, available: bool) -> ValidationResult<Vec<Product>> {
        (**self).find_by_availability(available).await
    }

    async fn find_by_category(&self, category: Category) -> ValidationResult<Vec<Product>> {
        (**self).find_by_category(category).await
    }

    async fn find_by_price(&self, price: PriceInput) -> ValidationResult<Vec<Product>> {
        (**self).find_by_price(price).await
    }
}

/// Id of a product that is about to be updated or deleted.
pub(crate) fn require_id(product: &Product, operation: &str) -> ValidationResult<ProductId> {
    product.id.ok_or_else(|| {
        DataValidationError::invalid(format!("{operation} called with empty ID field"))
    })
}

pub(crate) fn missing_row(operation: &str, id: ProductId) -> DataValidationError {
    DataValidationError::invalid(format!("{operation} called on missing product id=[{id}]"))
}
