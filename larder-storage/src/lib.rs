//! # larder-storage
//!
//! SQLite persistence layer for the Larder inventory engine.
//! Implements the `ICatalogStore`, `IStockStore`, and `IShoppingStore`
//! traits. Single write connection + read pool (WAL mode).

pub mod connection;
pub mod engine;
pub mod migrations;
pub mod queries;

pub use connection::{DatabaseManager, ReadPool};
pub use engine::LarderEngine;

use larder_core::{LarderError, StorageError};

/// Helper to convert a string message into a `LarderError::Storage`.
pub fn to_storage_err(msg: String) -> LarderError {
    LarderError::Storage(StorageError::SqliteError { message: msg })
}
