//! Product movements: the append-only history of stock changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::LarderResult;

use super::audit::{AuditStamp, Persisted};
use super::stored_product::validate_quantity;

/// What a movement records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Created,
    Moved,
    Consumed,
    Adjusted,
    Discarded,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::Created => "created",
            MovementKind::Moved => "moved",
            MovementKind::Consumed => "consumed",
            MovementKind::Adjusted => "adjusted",
            MovementKind::Discarded => "discarded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(MovementKind::Created),
            "moved" => Some(MovementKind::Moved),
            "consumed" => Some(MovementKind::Consumed),
            "adjusted" => Some(MovementKind::Adjusted),
            "discarded" => Some(MovementKind::Discarded),
            _ => None,
        }
    }
}

/// An immutable audit record of a stored product's location/quantity
/// change. Appended once, never updated or soft-deleted by any
/// operation; movements keep referencing products and locations that
/// were soft-deleted later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMovement {
    pub id: i64,
    pub stored_product_id: i64,
    pub kind: MovementKind,
    pub from_location_id: Option<i64>,
    pub to_location_id: Option<i64>,
    pub quantity: f64,
    pub unit: String,
    /// System- or caller-supplied context, stored verbatim.
    pub context: Option<String>,
    pub deleted: bool,
    pub audit: AuditStamp,
}

impl ProductMovement {
    /// When the movement was appended. Movements are never updated, so
    /// the audit stamp is the append instant.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.audit.last_modified
    }
}

impl Persisted for ProductMovement {
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

/// Append payload for a movement.
///
/// `from_location_id`/`to_location_id` are historical annotations and
/// are not checked against live locations; the stored product itself
/// must be live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovement {
    pub stored_product_id: i64,
    pub kind: MovementKind,
    pub from_location_id: Option<i64>,
    pub to_location_id: Option<i64>,
    pub quantity: f64,
    pub unit: String,
    pub context: Option<String>,
}

impl NewMovement {
    pub fn validate(&self) -> LarderResult<()> {
        validate_quantity(self.quantity)?;
        if self.unit.trim().is_empty() {
            return Err(crate::errors::LarderError::Validation {
                detail: "unit must not be empty".into(),
            });
        }
        Ok(())
    }
}
