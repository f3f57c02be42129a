//! Domain error types
//!
//! The estimator never fails on numeric input; these errors only arise
//! when constructing validated domain values at the edges.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid item path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}
