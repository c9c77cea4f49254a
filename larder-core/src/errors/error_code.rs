//! Stable error codes for boundary mapping.
//!
//! Callers that shape errors into a wire format match on these instead of
//! on enum variants, so variant renames don't break the surface.

/// Maps an error to a stable SCREAMING_SNAKE_CASE code.
pub trait LarderErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const NOT_FOUND: &str = "NOT_FOUND";
pub const CONFLICT: &str = "CONFLICT";
pub const INVALID_REFERENCE: &str = "INVALID_REFERENCE";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";

pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const POOL_EXHAUSTED: &str = "POOL_EXHAUSTED";
pub const POOL_CLOSED: &str = "POOL_CLOSED";
pub const LOCK_POISONED: &str = "LOCK_POISONED";
