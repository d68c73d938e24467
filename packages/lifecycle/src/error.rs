// ABOUTME: Error taxonomy for quotation lifecycle operations
// ABOUTME: Validation, NotFound, Conflict, and wrapped storage failures

use thiserror::Error;

use procura_core::validation::ValidationError;
use procura_storage::StorageError;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Also covers entities owned by another buyer; callers cannot tell
    /// "absent" from "not yours".
    #[error("Resource not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<ValidationError> for LifecycleError {
    fn from(e: ValidationError) -> Self {
        LifecycleError::Validation(e.to_string())
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
