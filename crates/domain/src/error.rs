//! Domain error types.

use storage::StorageError;
use thiserror::Error;

use crate::license::{LicenseError, LicenseStatus};
use crate::order::ValidationError;

/// Errors that can occur during repository operations.
///
/// All of these are detected before any state changes, except
/// [`DomainError::Storage`], which leaves in-memory state untouched when the
/// save fails.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The license does not currently allow writes.
    #[error("License is {status}, the app is read-only")]
    WriteDenied { status: LicenseStatus },

    /// A request field is missing or invalid.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No order carries the given code.
    #[error("Order not found: {code}")]
    NotFound { code: String },

    /// A license request was rejected.
    #[error("License error: {0}")]
    License(#[from] LicenseError),

    /// Persisting the change failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
