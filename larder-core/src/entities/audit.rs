//! The persistence contract shared by every stored entity:
//! system-assigned id, soft-delete flag, audit stamp, read visibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last-modification marker carried by every persisted row.
///
/// Refreshed by the storage engine immediately before each durable
/// write (create, update, soft-delete). Never settable by callers —
/// the creation payload types don't carry one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub last_modified: DateTime<Utc>,
}

impl AuditStamp {
    /// A stamp for the current instant.
    pub fn now() -> Self {
        Self { last_modified: Utc::now() }
    }
}

/// Capability implemented by every persisted entity type.
///
/// Each entity independently carries `{id, deleted, audit}`; there is
/// no shared base struct. Generic store plumbing is parameterized over
/// this trait instead.
pub trait Persisted {
    /// Stable row id, assigned at creation, never reused.
    fn id(&self) -> i64;
    /// Soft-delete flag. When true the row is invisible to
    /// default-scope reads but remains physically stored.
    fn deleted(&self) -> bool;
    /// Last-modification marker.
    fn audit(&self) -> &AuditStamp;
}

/// Read-path scope for single-row lookups.
///
/// `Live` is the default everywhere: soft-deleted rows are excluded
/// from every read unless a caller explicitly asks for
/// `IncludeDeleted` (the audit path).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Live,
    IncludeDeleted,
}

impl Visibility {
    /// SQL fragment appended to a `WHERE id = ?` lookup.
    pub fn predicate(self) -> &'static str {
        match self {
            Visibility::Live => " AND deleted = 0",
            Visibility::IncludeDeleted => "",
        }
    }
}
