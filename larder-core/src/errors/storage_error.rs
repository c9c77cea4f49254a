//! Storage-layer errors for SQLite operations.

use super::error_code::{self, LarderErrorCode};

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Read pool exhausted (no connection available within timeout)")]
    PoolExhausted,

    #[error("Read pool closed")]
    PoolClosed,

    #[error("Lock poisoned: {message}")]
    LockPoisoned { message: String },
}

impl LarderErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::PoolExhausted => error_code::POOL_EXHAUSTED,
            Self::PoolClosed => error_code::POOL_CLOSED,
            Self::LockPoisoned { .. } => error_code::LOCK_POISONED,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
