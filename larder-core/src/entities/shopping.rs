//! Shopping lists and their items.

use serde::{Deserialize, Serialize};

use crate::errors::{LarderError, LarderResult};

use super::audit::{AuditStamp, Persisted};
use super::stored_product::validate_quantity;

/// A named shopping list. Items are ordered by insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: i64,
    pub name: String,
    pub active: bool,
    /// Opaque caller payload, stored verbatim, never parsed.
    pub extra: Option<String>,
    pub deleted: bool,
    pub audit: AuditStamp,
}

impl Persisted for ShoppingList {
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

/// Creation/update payload for a list. New lists default to active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShoppingList {
    pub name: String,
    pub active: bool,
    pub extra: Option<String>,
}

impl NewShoppingList {
    /// An active list with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), active: true, extra: None }
    }

    pub fn validate(&self) -> LarderResult<()> {
        if self.name.trim().is_empty() {
            return Err(LarderError::Validation {
                detail: "shopping list name must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// One entry on a shopping list.
///
/// Carries its own denormalized name/brand/quantity/unit so it stays
/// meaningful when the template it optionally points at is mutated or
/// soft-deleted. The template reference, when present, was live at
/// assignment time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub id: i64,
    pub list_id: i64,
    pub template_id: Option<i64>,
    pub name: String,
    pub brand: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub purchased: bool,
    /// Opaque payload; the replenishment planner writes its audit
    /// annotation here, but nothing reads it back for logic.
    pub extra: Option<String>,
    pub deleted: bool,
    pub audit: AuditStamp,
}

impl ShoppingListItem {
    /// An item still waiting to be bought: not purchased, not deleted.
    pub fn is_open(&self) -> bool {
        !self.purchased && !self.deleted
    }
}

impl Persisted for ShoppingListItem {
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

/// Creation/update payload for an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShoppingListItem {
    pub template_id: Option<i64>,
    pub name: String,
    pub brand: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub purchased: bool,
    pub extra: Option<String>,
}

impl NewShoppingListItem {
    pub fn validate(&self) -> LarderResult<()> {
        if self.name.trim().is_empty() {
            return Err(LarderError::Validation {
                detail: "item name must not be empty".into(),
            });
        }
        validate_quantity(self.quantity)?;
        if self.unit.trim().is_empty() {
            return Err(LarderError::Validation {
                detail: "unit must not be empty".into(),
            });
        }
        Ok(())
    }
}
