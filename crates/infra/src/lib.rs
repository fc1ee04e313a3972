//! Infrastructure layer: store configuration, Postgres wiring, product repositories.

pub mod config;
pub mod db;
pub mod repository;

pub use config::{ConfigError, StoreConfig};
pub use repository::{InMemoryProductRepository, PostgresProductRepository, ProductRepository};
