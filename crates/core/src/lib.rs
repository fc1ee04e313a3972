//! `stockroom-core` — shared building blocks for the product catalogue.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DataValidationError, ValidationResult};
pub use id::ProductId;
