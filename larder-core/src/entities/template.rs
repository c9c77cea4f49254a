//! Product templates: reusable product definitions with a minimum-stock
//! threshold. Distinct from any physical unit of the product.

use serde::{Deserialize, Serialize};

use crate::errors::{LarderError, LarderResult};

use super::audit::{AuditStamp, Persisted};

/// Broad product category. Stored as text; display/grouping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Dairy,
    Meat,
    Produce,
    Bakery,
    Frozen,
    Canned,
    Beverage,
    Condiment,
    Other,
}

impl ProductKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductKind::Dairy => "dairy",
            ProductKind::Meat => "meat",
            ProductKind::Produce => "produce",
            ProductKind::Bakery => "bakery",
            ProductKind::Frozen => "frozen",
            ProductKind::Canned => "canned",
            ProductKind::Beverage => "beverage",
            ProductKind::Condiment => "condiment",
            ProductKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dairy" => Some(ProductKind::Dairy),
            "meat" => Some(ProductKind::Meat),
            "produce" => Some(ProductKind::Produce),
            "bakery" => Some(ProductKind::Bakery),
            "frozen" => Some(ProductKind::Frozen),
            "canned" => Some(ProductKind::Canned),
            "beverage" => Some(ProductKind::Beverage),
            "condiment" => Some(ProductKind::Condiment),
            "other" => Some(ProductKind::Other),
            _ => None,
        }
    }
}

/// A reusable product definition.
///
/// `(brand, name)` is unique among non-deleted templates; an absent
/// brand participates in the constraint as the empty string. Stock
/// aggregation and low-stock detection are template-scoped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTemplate {
    pub id: i64,
    pub brand: Option<String>,
    pub name: String,
    pub barcode: Option<String>,
    pub kind: ProductKind,
    /// Threshold for low-stock detection. Zero disables it.
    pub minimum_quantity: f64,
    /// Unit used when auto-adding to a shopping list.
    pub default_unit: Option<String>,
    /// Opaque caller payload, stored verbatim, never parsed.
    pub extra: Option<String>,
    pub deleted: bool,
    pub audit: AuditStamp,
}

impl Persisted for ProductTemplate {
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

/// Creation/update payload for a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProductTemplate {
    pub brand: Option<String>,
    pub name: String,
    pub barcode: Option<String>,
    pub kind: ProductKind,
    pub minimum_quantity: f64,
    pub default_unit: Option<String>,
    pub extra: Option<String>,
}

impl NewProductTemplate {
    pub fn validate(&self) -> LarderResult<()> {
        if self.name.trim().is_empty() {
            return Err(LarderError::Validation {
                detail: "template name must not be empty".into(),
            });
        }
        if !self.minimum_quantity.is_finite() || self.minimum_quantity < 0.0 {
            return Err(LarderError::Validation {
                detail: format!(
                    "minimum quantity must be a finite value >= 0, got {}",
                    self.minimum_quantity
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milk() -> NewProductTemplate {
        NewProductTemplate {
            brand: Some("Acme".into()),
            name: "Milk".into(),
            barcode: None,
            kind: ProductKind::Dairy,
            minimum_quantity: 2.0,
            default_unit: Some("L".into()),
            extra: None,
        }
    }

    #[test]
    fn valid_template_passes() {
        assert!(milk().validate().is_ok());
    }

    #[test]
    fn negative_minimum_is_rejected() {
        let mut t = milk();
        t.minimum_quantity = -1.0;
        assert!(matches!(t.validate(), Err(LarderError::Validation { .. })));
    }

    #[test]
    fn non_finite_minimum_is_rejected() {
        let mut t = milk();
        t.minimum_quantity = f64::NAN;
        assert!(t.validate().is_err());
        t.minimum_quantity = f64::INFINITY;
        assert!(t.validate().is_err());
    }

    #[test]
    fn kind_round_trips_as_str() {
        for kind in [
            ProductKind::Dairy,
            ProductKind::Meat,
            ProductKind::Produce,
            ProductKind::Bakery,
            ProductKind::Frozen,
            ProductKind::Canned,
            ProductKind::Beverage,
            ProductKind::Condiment,
            ProductKind::Other,
        ] {
            assert_eq!(ProductKind::parse(kind.as_str()), Some(kind));
        }
    }
}
