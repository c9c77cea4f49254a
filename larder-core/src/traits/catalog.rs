//! `ICatalogStore` trait — storage locations and product templates.
//!
//! Maps to `larder-storage/src/queries/locations.rs` + `queries/templates.rs`.

use std::sync::Arc;

use crate::entities::{
    NewProductTemplate, NewStorageLocation, ProductTemplate, StorageLocation,
};
use crate::errors::LarderResult;

// ─── Trait ───────────────────────────────────────────────────────────

/// CRUD over the two catalog entities.
///
/// Every read excludes soft-deleted rows; the `_including_deleted`
/// lookups are the explicit audit path. Creates and updates refresh the
/// audit stamp; soft-deletes never cascade to dependents.
pub trait ICatalogStore: Send + Sync {
    // ── storage locations ──

    /// Create a location. Fails with `Validation` on an empty name.
    fn create_location(&self, new: &NewStorageLocation) -> LarderResult<StorageLocation>;

    /// Get a live location. `NotFound` if absent or soft-deleted.
    fn get_location(&self, id: i64) -> LarderResult<StorageLocation>;

    /// Get a location regardless of its soft-delete flag.
    fn get_location_including_deleted(&self, id: i64) -> LarderResult<StorageLocation>;

    /// All live locations, ordered by id.
    fn list_locations(&self) -> LarderResult<Vec<StorageLocation>>;

    /// Full-field replace. `NotFound` if absent or soft-deleted.
    fn update_location(
        &self,
        id: i64,
        fields: &NewStorageLocation,
    ) -> LarderResult<StorageLocation>;

    /// Set the soft-delete flag. `NotFound` if already deleted or absent.
    fn soft_delete_location(&self, id: i64) -> LarderResult<()>;

    // ── product templates ──

    /// Create a template. Fails with `Conflict` when a live template
    /// with the same (brand, name) already exists.
    fn create_template(&self, new: &NewProductTemplate) -> LarderResult<ProductTemplate>;

    /// Get a live template. `NotFound` if absent or soft-deleted.
    fn get_template(&self, id: i64) -> LarderResult<ProductTemplate>;

    /// Get a template regardless of its soft-delete flag.
    fn get_template_including_deleted(&self, id: i64) -> LarderResult<ProductTemplate>;

    /// All live templates, ordered by id.
    fn list_templates(&self) -> LarderResult<Vec<ProductTemplate>>;

    /// Full-field replace. `Conflict` when the new (brand, name) collides
    /// with a different live template.
    fn update_template(
        &self,
        id: i64,
        fields: &NewProductTemplate,
    ) -> LarderResult<ProductTemplate>;

    /// Set the soft-delete flag. Stored products and shopping-list items
    /// referencing the template are left untouched.
    fn soft_delete_template(&self, id: i64) -> LarderResult<()>;
}

// ─── Arc blanket impl ───────────────────────────────────────────────

impl<T: ICatalogStore + ?Sized> ICatalogStore for Arc<T> {
    fn create_location(&self, new: &NewStorageLocation) -> LarderResult<StorageLocation> {
        (**self).create_location(new)
    }
    fn get_location(&self, id: i64) -> LarderResult<StorageLocation> {
        (**self).get_location(id)
    }
    fn get_location_including_deleted(&self, id: i64) -> LarderResult<StorageLocation> {
        (**self).get_location_including_deleted(id)
    }
    fn list_locations(&self) -> LarderResult<Vec<StorageLocation>> {
        (**self).list_locations()
    }
    fn update_location(
        &self,
        id: i64,
        fields: &NewStorageLocation,
    ) -> LarderResult<StorageLocation> {
        (**self).update_location(id, fields)
    }
    fn soft_delete_location(&self, id: i64) -> LarderResult<()> {
        (**self).soft_delete_location(id)
    }
    fn create_template(&self, new: &NewProductTemplate) -> LarderResult<ProductTemplate> {
        (**self).create_template(new)
    }
    fn get_template(&self, id: i64) -> LarderResult<ProductTemplate> {
        (**self).get_template(id)
    }
    fn get_template_including_deleted(&self, id: i64) -> LarderResult<ProductTemplate> {
        (**self).get_template_including_deleted(id)
    }
    fn list_templates(&self) -> LarderResult<Vec<ProductTemplate>> {
        (**self).list_templates()
    }
    fn update_template(
        &self,
        id: i64,
        fields: &NewProductTemplate,
    ) -> LarderResult<ProductTemplate> {
        (**self).update_template(id, fields)
    }
    fn soft_delete_template(&self, id: i64) -> LarderResult<()> {
        (**self).soft_delete_template(id)
    }
}
