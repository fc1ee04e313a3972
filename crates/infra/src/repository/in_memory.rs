use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stockroom_core::{DataValidationError, ProductId, ValidationResult};
use stockroom_products::{Category, PRICE_SCALE, PriceInput, Product};

use super::r#trait::{ProductRepository, missing_row, require_id};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<ProductId, Product>,
    last_id: i64,
}

/// In-memory product repository.
///
/// Intended for tests/dev. Behaves like the Postgres table: ids come from a
/// sequence starting at 1 and prices are stored at the column scale.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    table: RwLock<Table>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Table) -> T) -> ValidationResult<T> {
        let table = self
            .table
            .read()
            .map_err(|_| DataValidationError::store("read", "lock poisoned"))?;
        Ok(f(&table))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Table) -> ValidationResult<T>) -> ValidationResult<T> {
        let mut table = self
            .table
            .write()
            .map_err(|_| DataValidationError::store("write", "lock poisoned"))?;
        f(&mut table)
    }

    fn select(&self, predicate: impl Fn(&Product) -> bool) -> ValidationResult<Vec<Product>> {
        self.read(|table| {
            table
                .rows
                .values()
                .filter(|p| predicate(p))
                .cloned()
                .collect()
        })
    }

    fn stored_row(product: &Product, id: ProductId) -> Product {
        let mut row = product.clone();
        row.id = Some(id);
        row.price.rescale(PRICE_SCALE);
        row
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: &mut Product) -> ValidationResult<()> {
        product.validate()?;
        let id = self.write(|table| {
            table.last_id += 1;
            let id = ProductId::new(table.last_id);
            table.rows.insert(id, Self::stored_row(product, id));
            Ok(id)
        })?;
        product.id = Some(id);
        Ok(())
    }

    async fn update(&self, product: &Product) -> ValidationResult<()> {
        let id = require_id(product, "Update")?;
        product.validate()?;
        self.write(|table| match table.rows.get_mut(&id) {
            Some(row) => {
                *row = Self::stored_row(product, id);
                Ok(())
            }
            None => Err(missing_row("Update", id)),
        })
    }

    async fn delete(&self, product: Product) -> ValidationResult<()> {
        let id = require_id(&product, "Delete")?;
        self.write(|table| match table.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(missing_row("Delete", id)),
        })
    }

    async fn all(&self) -> ValidationResult<Vec<Product>> {
        self.select(|_| true)
    }

    async fn find(&self, id: ProductId) -> ValidationResult<Option<Product>> {
        self.read(|table| table.rows.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> ValidationResult<Vec<Product>> {
        self.select(|p| p.name == name)
    }

    async fn find_by_availability(&self, available: bool) -> ValidationResult<Vec<Product>> {
        self.select(|p| p.available == available)
    }

    async fn find_by_category(&self, category: Category) -> ValidationResult<Vec<Product>> {
        self.select(|p| p.category == category)
    }

    async fn find_by_price(&self, price: PriceInput) -> ValidationResult<Vec<Product>> {
        let price = price.to_decimal()?;
        self.select(|p| p.price == price)
    }
}
