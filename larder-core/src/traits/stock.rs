//! `IStockStore` trait — stored products, stock aggregation, low-stock
//! detection, and the movement ledger.
//!
//! Maps to `larder-storage/src/queries/stored_products.rs` +
//! `queries/movements.rs`.

use std::sync::Arc;

use crate::entities::{
    NewMovement, NewStoredProduct, ProductMovement, ProductTemplate, StoredProduct,
};
use crate::errors::LarderResult;

// ─── Row Types ──────────────────────────────────────────────────────

/// One shortage: a template whose aggregated live stock is below its
/// configured minimum.
#[derive(Debug, Clone, PartialEq)]
pub struct LowStockEntry {
    pub template: ProductTemplate,
    /// Sum of live stored-product quantities at detection time.
    pub current_stock: f64,
    /// `minimum_quantity - current_stock`, always > 0 for an entry.
    pub shortfall: f64,
}

/// Result of the composite move operation: the updated product and the
/// movement row appended in the same transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReceipt {
    pub product: StoredProduct,
    pub movement: ProductMovement,
}

// ─── Trait ───────────────────────────────────────────────────────────

/// Stored-product CRUD, fresh stock aggregation, and the append-only
/// movement ledger.
pub trait IStockStore: Send + Sync {
    // ── stored products ──

    /// Create a stored product. `InvalidReference` when the template or
    /// location is absent or soft-deleted.
    fn create_stored_product(&self, new: &NewStoredProduct) -> LarderResult<StoredProduct>;

    /// Get a live stored product. `NotFound` if absent or soft-deleted.
    fn get_stored_product(&self, id: i64) -> LarderResult<StoredProduct>;

    /// Get a stored product regardless of its soft-delete flag.
    fn get_stored_product_including_deleted(&self, id: i64) -> LarderResult<StoredProduct>;

    /// All live stored products, ordered by id.
    fn list_stored_products(&self) -> LarderResult<Vec<StoredProduct>>;

    /// Live stored products at one location. Unknown locations yield an
    /// empty list, not an error.
    fn list_stored_products_at(&self, location_id: i64) -> LarderResult<Vec<StoredProduct>>;

    /// Live stored products referencing one template.
    fn list_stored_products_for_template(
        &self,
        template_id: i64,
    ) -> LarderResult<Vec<StoredProduct>>;

    /// Live stored products whose expiry date falls within `days` from
    /// now, soonest first. Products without an expiry date are excluded.
    fn list_expiring_within(&self, days: i64) -> LarderResult<Vec<StoredProduct>>;

    /// Full-field replace; re-checks both references against live rows.
    fn update_stored_product(
        &self,
        id: i64,
        fields: &NewStoredProduct,
    ) -> LarderResult<StoredProduct>;

    /// Set the soft-delete flag. The product's movement history stays.
    fn soft_delete_stored_product(&self, id: i64) -> LarderResult<()>;

    // ── stock aggregation ──

    /// Sum of live stored-product quantities for one template, computed
    /// fresh on each call. 0.0 when no rows exist. `NotFound` when the
    /// template itself is absent or soft-deleted.
    fn current_stock(&self, template_id: i64) -> LarderResult<f64>;

    /// Every live template whose aggregated stock is strictly below its
    /// minimum, ordered by template id. Stock exactly at the minimum is
    /// not low. Templates with no stored products appear with stock 0.
    fn low_stock(&self) -> LarderResult<Vec<LowStockEntry>>;

    // ── movement ledger ──

    /// Append a movement. `InvalidReference` when the stored product is
    /// absent or soft-deleted; from/to location ids pass through
    /// unchecked as historical annotations.
    fn record_movement(&self, new: &NewMovement) -> LarderResult<ProductMovement>;

    /// Full movement history for a stored product, oldest first. Works
    /// for soft-deleted products too; unknown ids yield an empty list.
    fn list_movements(&self, stored_product_id: i64) -> LarderResult<Vec<ProductMovement>>;

    /// Relocate a stored product and optionally set a new quantity.
    ///
    /// Verifies the product is live (`NotFound`) and the destination is
    /// live (`InvalidReference`), applies the change, and appends a
    /// `Moved` movement recording the pre-move location. Update and
    /// append commit in one transaction; a failure leaves neither.
    fn move_product(
        &self,
        stored_product_id: i64,
        to_location_id: i64,
        new_quantity: Option<f64>,
    ) -> LarderResult<MoveReceipt>;
}

// ─── Arc blanket impl ───────────────────────────────────────────────

impl<T: IStockStore + ?Sized> IStockStore for Arc<T> {
    fn create_stored_product(&self, new: &NewStoredProduct) -> LarderResult<StoredProduct> {
        (**self).create_stored_product(new)
    }
    fn get_stored_product(&self, id: i64) -> LarderResult<StoredProduct> {
        (**self).get_stored_product(id)
    }
    fn get_stored_product_including_deleted(&self, id: i64) -> LarderResult<StoredProduct> {
        (**self).get_stored_product_including_deleted(id)
    }
    fn list_stored_products(&self) -> LarderResult<Vec<StoredProduct>> {
        (**self).list_stored_products()
    }
    fn list_stored_products_at(&self, location_id: i64) -> LarderResult<Vec<StoredProduct>> {
        (**self).list_stored_products_at(location_id)
    }
    fn list_stored_products_for_template(
        &self,
        template_id: i64,
    ) -> LarderResult<Vec<StoredProduct>> {
        (**self).list_stored_products_for_template(template_id)
    }
    fn list_expiring_within(&self, days: i64) -> LarderResult<Vec<StoredProduct>> {
        (**self).list_expiring_within(days)
    }
    fn update_stored_product(
        &self,
        id: i64,
        fields: &NewStoredProduct,
    ) -> LarderResult<StoredProduct> {
        (**self).update_stored_product(id, fields)
    }
    fn soft_delete_stored_product(&self, id: i64) -> LarderResult<()> {
        (**self).soft_delete_stored_product(id)
    }
    fn current_stock(&self, template_id: i64) -> LarderResult<f64> {
        (**self).current_stock(template_id)
    }
    fn low_stock(&self) -> LarderResult<Vec<LowStockEntry>> {
        (**self).low_stock()
    }
    fn record_movement(&self, new: &NewMovement) -> LarderResult<ProductMovement> {
        (**self).record_movement(new)
    }
    fn list_movements(&self, stored_product_id: i64) -> LarderResult<Vec<ProductMovement>> {
        (**self).list_movements(stored_product_id)
    }
    fn move_product(
        &self,
        stored_product_id: i64,
        to_location_id: i64,
        new_quantity: Option<f64>,
    ) -> LarderResult<MoveReceipt> {
        (**self).move_product(stored_product_id, to_location_id, new_quantity)
    }
}
