//! Tracing/logging setup shared by binaries and test suites.
//!
//! Library crates only emit spans and events; installing a subscriber is the
//! hosting process's call.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use tracing::{LogFormat, init, init_with};
