//! Error types for the selection store.
//!
//! Only programmer errors surface here. Conflicts found while resolving a
//! mutation (missing items, duplicates, redundant selections) are reported as
//! [`LogEntry`](crate::types::LogEntry) values instead.

use thiserror::Error;

/// Main error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid observer: {0}")]
    InvalidObserver(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
