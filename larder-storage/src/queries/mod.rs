//! Table-scoped query functions.
//!
//! Every function takes a `&Connection` so the caller controls
//! transaction boundaries. Domain mapping (NotFound, Conflict,
//! InvalidReference) happens here; the engine only routes connections.

pub mod locations;
pub mod movements;
pub mod shopping_items;
pub mod shopping_lists;
pub mod stored_products;
pub mod templates;

use chrono::{DateTime, Utc};

use larder_core::{AuditStamp, LarderResult};

use crate::to_storage_err;

/// Parse an RFC3339 TEXT column.
pub(crate) fn parse_dt(s: &str) -> LarderResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| to_storage_err(format!("parse datetime '{s}': {e}")))
}

/// Serialize an audit stamp for its TEXT column.
pub(crate) fn audit_to_json(stamp: &AuditStamp) -> LarderResult<String> {
    serde_json::to_string(stamp).map_err(|e| to_storage_err(e.to_string()))
}

/// Parse the audit TEXT column.
pub(crate) fn parse_audit(s: &str) -> LarderResult<AuditStamp> {
    serde_json::from_str(s).map_err(|e| to_storage_err(format!("parse audit stamp: {e}")))
}

/// Helper trait to make `query_row` return `Option` on not-found.
pub(crate) trait OptionalRow<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalRow<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
