//! Storage locations: the physical places stock lives in.

use serde::{Deserialize, Serialize};

use crate::errors::{LarderError, LarderResult};

use super::audit::{AuditStamp, Persisted};

/// Where a location physically is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Fridge,
    Pantry,
    Freezer,
    Other,
}

impl LocationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationKind::Fridge => "fridge",
            LocationKind::Pantry => "pantry",
            LocationKind::Freezer => "freezer",
            LocationKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fridge" => Some(LocationKind::Fridge),
            "pantry" => Some(LocationKind::Pantry),
            "freezer" => Some(LocationKind::Freezer),
            "other" => Some(LocationKind::Other),
            _ => None,
        }
    }
}

/// A physical storage place (a fridge shelf, the pantry, a freezer drawer).
///
/// Owns zero or more stored products. Soft-deleting a location does not
/// cascade to its products; readers treat the dangling reference as
/// historical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub id: i64,
    pub name: String,
    pub kind: LocationKind,
    /// Opaque caller payload, stored verbatim, never parsed.
    pub extra: Option<String>,
    pub deleted: bool,
    pub audit: AuditStamp,
}

impl Persisted for StorageLocation {
    fn id(&self) -> i64 {
        self.id
    }
    fn deleted(&self) -> bool {
        self.deleted
    }
    fn audit(&self) -> &AuditStamp {
        &self.audit
    }
}

/// Creation/update payload. Carries no id, flag, or stamp — those are
/// system-assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStorageLocation {
    pub name: String,
    pub kind: LocationKind,
    pub extra: Option<String>,
}

impl NewStorageLocation {
    pub fn validate(&self) -> LarderResult<()> {
        if self.name.trim().is_empty() {
            return Err(LarderError::Validation {
                detail: "location name must not be empty".into(),
            });
        }
        Ok(())
    }
}
