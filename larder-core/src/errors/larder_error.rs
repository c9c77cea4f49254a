//! Domain errors returned by the inventory engine.

use super::error_code::{self, LarderErrorCode};
use super::StorageError;

/// Errors the engine surfaces to its callers.
///
/// Every operation returns a typed failure, never a partial mutation.
/// All variants are recoverable at the boundary; the caller may retry.
#[derive(Debug, thiserror::Error)]
pub enum LarderError {
    /// The entity the operation targets is absent or soft-deleted.
    #[error("{entity} not found: id {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// A uniqueness invariant would be violated.
    #[error("conflict on {entity}: {detail}")]
    Conflict { entity: &'static str, detail: String },

    /// A required foreign entity does not exist or is soft-deleted.
    #[error("invalid reference to {entity}: id {id}")]
    InvalidReference { entity: &'static str, id: i64 },

    /// A required field is missing or a value is out of range.
    #[error("validation failed: {detail}")]
    Validation { detail: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Convenience type alias.
pub type LarderResult<T> = Result<T, LarderError>;

impl LarderErrorCode for LarderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::Conflict { .. } => error_code::CONFLICT,
            Self::InvalidReference { .. } => error_code::INVALID_REFERENCE,
            Self::Validation { .. } => error_code::VALIDATION_ERROR,
            Self::Storage(e) => e.error_code(),
        }
    }
}
