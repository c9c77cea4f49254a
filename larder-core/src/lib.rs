//! # larder-core
//!
//! Foundation crate for the Larder inventory engine.
//! Defines the entity types, the shared persistence contract, storage
//! traits, errors, config, and telemetry. The storage crate depends on
//! this; nothing here touches SQLite.

pub mod config;
pub mod entities;
pub mod errors;
pub mod telemetry;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::LarderConfig;
pub use entities::audit::{AuditStamp, Persisted, Visibility};
pub use errors::error_code::LarderErrorCode;
pub use errors::{LarderError, LarderResult, StorageError};
