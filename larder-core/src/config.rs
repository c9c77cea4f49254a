//! Engine configuration, loaded from a TOML file or built in code.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{LarderError, LarderResult};

/// Configuration for the inventory engine.
///
/// Every field is optional; `effective_*` accessors supply the defaults
/// so a partially-filled `larder.toml` (or none at all) still works.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LarderConfig {
    /// Path to the SQLite database file. Default: "larder.db".
    pub database_path: Option<String>,
    /// Number of pooled read connections. Default: 4, clamped to 8.
    pub reader_pool_size: Option<usize>,
    /// Horizon for the expiring-soon query, in days. Default: 7.
    pub expiry_window_days: Option<i64>,
}

impl LarderConfig {
    /// Parse config from a TOML string, falling back to defaults for
    /// missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> LarderResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LarderError::Validation {
            detail: format!("cannot read config {}: {e}", path.display()),
        })?;
        let config = Self::from_toml(&content).map_err(|e| LarderError::Validation {
            detail: format!("cannot parse config {}: {e}", path.display()),
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Returns the effective database path, defaulting to "larder.db".
    pub fn effective_database_path(&self) -> &str {
        self.database_path.as_deref().unwrap_or("larder.db")
    }

    /// Returns the effective reader pool size, defaulting to 4.
    pub fn effective_reader_pool_size(&self) -> usize {
        self.reader_pool_size.unwrap_or(4)
    }

    /// Returns the effective expiry window, defaulting to 7 days.
    pub fn effective_expiry_window_days(&self) -> i64 {
        self.expiry_window_days.unwrap_or(7)
    }
}
