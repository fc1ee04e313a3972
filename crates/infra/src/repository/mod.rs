//! Product repository boundary.
//!
//! The entity stays a plain value; these types mediate between it and the
//! store. Each mutating operation is a single "act, then commit-or-rollback"
//! unit against the store.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryProductRepository;
pub use postgres::PostgresProductRepository;
pub(crate) use postgres::map_sqlx_error;
pub use r#trait::ProductRepository;
