//! Stored products: a physical quantity of a template at one location.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{LarderError, LarderResult};

use super::audit::{AuditStamp, Persisted};

/// A physical quantity of a product at a specific location.
///
/// References exactly one template and one location; both must be live
/// at creation/update time. Quantity is always >= 0. Location and
/// quantity changes through the move operation leave a movement row
/// behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProduct {
    pub id: i64,
    pub template_id: i64,
    pub location_id: i64,
    pub quantity: f64,
    pub unit: String,
    pub expiry_date: Option<DateTime<Utc>>,
    pub purchase_date: Option<DateTime<Utc>>,
    /// Opaque caller payload, stored verbatim, never parsed.
    pub extra: Option<String>,
    pub deleted: bool,
    pub audit: AuditStamp,
}

impl Persisted for StoredProduct {
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

/// Creation/update payload for a stored product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStoredProduct {
    pub template_id: i64,
    pub location_id: i64,
    pub quantity: f64,
    pub unit: String,
    pub expiry_date: Option<DateTime<Utc>>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub extra: Option<String>,
}

impl NewStoredProduct {
    pub fn validate(&self) -> LarderResult<()> {
        validate_quantity(self.quantity)?;
        if self.unit.trim().is_empty() {
            return Err(LarderError::Validation {
                detail: "unit must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Shared quantity rule: finite and non-negative.
pub fn validate_quantity(quantity: f64) -> LarderResult<()> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(LarderError::Validation {
            detail: format!("quantity must be a finite value >= 0, got {quantity}"),
        });
    }
    Ok(())
}
