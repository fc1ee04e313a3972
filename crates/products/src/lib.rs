//! Products domain module.
//!
//! This crate contains the product entity and its boundary contracts
//! (validation, serialization), implemented as plain domain logic
//! (no IO, no HTTP, no storage).

pub mod category;
pub mod price;
pub mod product;

pub use category::Category;
pub use price::{PRICE_PRECISION, PRICE_SCALE, PriceInput};
pub use product::Product;
pub use rust_decimal::Decimal;
