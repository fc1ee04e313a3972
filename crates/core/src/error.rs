//! Validation error model.

use thiserror::Error;

/// Result type used across the catalogue.
pub type ValidationResult<T> = Result<T, DataValidationError>;

/// The single error kind surfaced to callers.
///
/// Bad input and store failures share one type so callers only have to match
/// on one thing, but they stay distinguishable through the variant
/// (see [`DataValidationError::is_store_failure`]).
///
/// `Display` renders the caller-facing message verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataValidationError {
    /// Malformed or inadmissible input/state.
    #[error("{0}")]
    Invalid(String),

    /// The underlying store rejected or failed the operation.
    #[error("store error in {operation}: {message}")]
    Store { operation: String, message: String },
}

impl DataValidationError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// True when the error wraps a store failure rather than bad data.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store { .. })
    }

    /// The human-readable message (same as `to_string()`).
    pub fn message(&self) -> String {
        self.to_string()
    }
}
