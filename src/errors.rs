use thiserror::Error;

use crate::storage::StorageError;

/// Service-level error type shared by every service in the crate.
///
/// Validation and permission failures are discriminated variants so callers
/// can tell a rejected input apart from an infrastructure failure. Not-found
/// conditions on edits and removals are deliberately *not* errors: stale views
/// retry those operations freely, so the services treat an unknown id as a
/// no-op instead.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(errors.to_string())
    }
}

impl ServiceError {
    /// True when the error is a rejected input rather than an
    /// infrastructure failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::ValidationError(_))
    }
}
