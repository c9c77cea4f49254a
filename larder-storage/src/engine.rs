//! `LarderEngine` — unified storage engine implementing all 3 larder storage traits.
//!
//! Wraps `DatabaseManager` (read/write routing). All reads go through
//! `with_reader()`, all writes through `with_writer()`. This is the single
//! owner of the database — no code outside this crate should touch a raw
//! `&Connection` for larder.db operations.
//!
//! Composite writes (`move_product`, `auto_add_low_stock`) run inside one
//! transaction on the write connection; a failure rolls the whole step back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Duration, Utc};

use larder_core::config::LarderConfig;
use larder_core::entities::{
    NewMovement, NewProductTemplate, NewShoppingList, NewShoppingListItem,
    NewStorageLocation, NewStoredProduct, ProductMovement, ProductTemplate,
    ShoppingList, ShoppingListItem, StorageLocation, StoredProduct,
};
use larder_core::traits::{
    ICatalogStore, IShoppingStore, IStockStore, LowStockEntry, MoveReceipt,
};
use larder_core::{AuditStamp, LarderError, LarderResult, Visibility};

use crate::connection::{DatabaseManager, ReadPool};
use crate::queries;
use crate::to_storage_err;

/// The unified Larder storage engine.
///
/// Owns `DatabaseManager` (single write connection + read pool) and
/// implements the three storage traits from `larder-core`.
pub struct LarderEngine {
    db: DatabaseManager,
    expiry_window_days: i64,
}

impl LarderEngine {
    /// Open a file-backed engine at the given path with default settings.
    /// Runs migrations and applies pragmas.
    pub fn open(path: &Path) -> LarderResult<Self> {
        let db = DatabaseManager::open(path, ReadPool::default_size())?;
        Ok(Self {
            db,
            expiry_window_days: LarderConfig::default().effective_expiry_window_days(),
        })
    }

    /// Open a file-backed engine from a config, honoring its database
    /// path, pool size, and expiry window.
    pub fn open_with_config(config: &LarderConfig) -> LarderResult<Self> {
        let path = PathBuf::from(config.effective_database_path());
        let db = DatabaseManager::open(&path, config.effective_reader_pool_size())?;
        Ok(Self {
            db,
            expiry_window_days: config.effective_expiry_window_days(),
        })
    }

    /// Open an in-memory engine (for testing). Reads route through the
    /// write connection since a second connection would see a different
    /// database.
    pub fn open_in_memory() -> LarderResult<Self> {
        let db = DatabaseManager::open_in_memory()?;
        Ok(Self {
            db,
            expiry_window_days: LarderConfig::default().effective_expiry_window_days(),
        })
    }

    /// WAL checkpoint delegation.
    pub fn checkpoint(&self) -> LarderResult<()> {
        self.db.checkpoint()
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.db.path()
    }

    /// Horizon used by `list_expiring_soon`.
    pub fn expiry_window_days(&self) -> i64 {
        self.expiry_window_days
    }

    /// Live stored products expiring within the configured window.
    /// This is the concrete convenience over `list_expiring_within` —
    /// NOT on the trait.
    pub fn list_expiring_soon(&self) -> LarderResult<Vec<StoredProduct>> {
        self.list_expiring_within(self.expiry_window_days)
    }

    /// Expose as `Arc<dyn ICatalogStore>` for consumers that only manage
    /// the catalog.
    pub fn as_catalog_store(self: &Arc<Self>) -> Arc<dyn ICatalogStore> {
        Arc::clone(self) as Arc<dyn ICatalogStore>
    }

    /// Expose as `Arc<dyn IStockStore>`.
    pub fn as_stock_store(self: &Arc<Self>) -> Arc<dyn IStockStore> {
        Arc::clone(self) as Arc<dyn IStockStore>
    }

    /// Expose as `Arc<dyn IShoppingStore>`.
    pub fn as_shopping_store(self: &Arc<Self>) -> Arc<dyn IShoppingStore> {
        Arc::clone(self) as Arc<dyn IShoppingStore>
    }

    /// Raw read access — for operations not yet covered by a trait method.
    /// Prefer trait methods where possible.
    pub fn with_reader<F, T>(&self, f: F) -> LarderResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> LarderResult<T>,
    {
        self.db.with_reader(f)
    }

    /// Raw write access — for operations not yet covered by a trait method.
    /// Prefer trait methods where possible.
    pub fn with_writer<F, T>(&self, f: F) -> LarderResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> LarderResult<T>,
    {
        self.db.with_writer(f)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ICatalogStore implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl ICatalogStore for LarderEngine {
    // ── storage locations ──

    fn create_location(&self, new: &NewStorageLocation) -> LarderResult<StorageLocation> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::locations::insert_location(conn, new, &stamp))
    }

    fn get_location(&self, id: i64) -> LarderResult<StorageLocation> {
        self.db.with_reader(|conn| {
            queries::locations::get_location(conn, id, Visibility::Live)?
                .ok_or(LarderError::NotFound { entity: "storage_location", id })
        })
    }

    fn get_location_including_deleted(&self, id: i64) -> LarderResult<StorageLocation> {
        self.db.with_reader(|conn| {
            queries::locations::get_location(conn, id, Visibility::IncludeDeleted)?
                .ok_or(LarderError::NotFound { entity: "storage_location", id })
        })
    }

    fn list_locations(&self) -> LarderResult<Vec<StorageLocation>> {
        self.db.with_reader(queries::locations::list_locations)
    }

    fn update_location(
        &self,
        id: i64,
        fields: &NewStorageLocation,
    ) -> LarderResult<StorageLocation> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::locations::update_location(conn, id, fields, &stamp))
    }

    fn soft_delete_location(&self, id: i64) -> LarderResult<()> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::locations::soft_delete_location(conn, id, &stamp))
    }

    // ── product templates ──

    fn create_template(&self, new: &NewProductTemplate) -> LarderResult<ProductTemplate> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::templates::insert_template(conn, new, &stamp))
    }

    fn get_template(&self, id: i64) -> LarderResult<ProductTemplate> {
        self.db.with_reader(|conn| {
            queries::templates::get_template(conn, id, Visibility::Live)?
                .ok_or(LarderError::NotFound { entity: "product_template", id })
        })
    }

    fn get_template_including_deleted(&self, id: i64) -> LarderResult<ProductTemplate> {
        self.db.with_reader(|conn| {
            queries::templates::get_template(conn, id, Visibility::IncludeDeleted)?
                .ok_or(LarderError::NotFound { entity: "product_template", id })
        })
    }

    fn list_templates(&self) -> LarderResult<Vec<ProductTemplate>> {
        self.db.with_reader(queries::templates::list_templates)
    }

    fn update_template(
        &self,
        id: i64,
        fields: &NewProductTemplate,
    ) -> LarderResult<ProductTemplate> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::templates::update_template(conn, id, fields, &stamp))
    }

    fn soft_delete_template(&self, id: i64) -> LarderResult<()> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::templates::soft_delete_template(conn, id, &stamp))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IStockStore implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl IStockStore for LarderEngine {
    // ── stored products ──

    fn create_stored_product(&self, new: &NewStoredProduct) -> LarderResult<StoredProduct> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::stored_products::insert_product(conn, new, &stamp))
    }

    fn get_stored_product(&self, id: i64) -> LarderResult<StoredProduct> {
        self.db.with_reader(|conn| {
            queries::stored_products::get_product(conn, id, Visibility::Live)?
                .ok_or(LarderError::NotFound { entity: "stored_product", id })
        })
    }

    fn get_stored_product_including_deleted(&self, id: i64) -> LarderResult<StoredProduct> {
        self.db.with_reader(|conn| {
            queries::stored_products::get_product(conn, id, Visibility::IncludeDeleted)?
                .ok_or(LarderError::NotFound { entity: "stored_product", id })
        })
    }

    fn list_stored_products(&self) -> LarderResult<Vec<StoredProduct>> {
        self.db.with_reader(queries::stored_products::list_products)
    }

    fn list_stored_products_at(&self, location_id: i64) -> LarderResult<Vec<StoredProduct>> {
        self.db
            .with_reader(|conn| queries::stored_products::list_products_at(conn, location_id))
    }

    fn list_stored_products_for_template(
        &self,
        template_id: i64,
    ) -> LarderResult<Vec<StoredProduct>> {
        self.db.with_reader(|conn| {
            queries::stored_products::list_products_for_template(conn, template_id)
        })
    }

    fn list_expiring_within(&self, days: i64) -> LarderResult<Vec<StoredProduct>> {
        let cutoff = Utc::now() + Duration::days(days);
        self.db
            .with_reader(|conn| queries::stored_products::list_expiring_before(conn, cutoff))
    }

    fn update_stored_product(
        &self,
        id: i64,
        fields: &NewStoredProduct,
    ) -> LarderResult<StoredProduct> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::stored_products::update_product(conn, id, fields, &stamp))
    }

    fn soft_delete_stored_product(&self, id: i64) -> LarderResult<()> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::stored_products::soft_delete_product(conn, id, &stamp))
    }

    // ── stock aggregation ──

    fn current_stock(&self, template_id: i64) -> LarderResult<f64> {
        self.db
            .with_reader(|conn| queries::stored_products::current_stock(conn, template_id))
    }

    fn low_stock(&self) -> LarderResult<Vec<LowStockEntry>> {
        self.db.with_reader(queries::stored_products::low_stock)
    }

    // ── movement ledger ──

    fn record_movement(&self, new: &NewMovement) -> LarderResult<ProductMovement> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::movements::insert_movement(conn, new, &stamp))
    }

    fn list_movements(&self, stored_product_id: i64) -> LarderResult<Vec<ProductMovement>> {
        self.db
            .with_reader(|conn| queries::movements::list_movements(conn, stored_product_id))
    }

    fn move_product(
        &self,
        stored_product_id: i64,
        to_location_id: i64,
        new_quantity: Option<f64>,
    ) -> LarderResult<MoveReceipt> {
        let stamp = AuditStamp::now();
        let receipt = self.db.with_writer(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| to_storage_err(e.to_string()))?;
            let receipt = queries::movements::move_product(
                &tx,
                stored_product_id,
                to_location_id,
                new_quantity,
                &stamp,
            )?;
            tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
            Ok(receipt)
        })?;
        tracing::debug!(stored_product_id, to_location_id, "moved stored product");
        Ok(receipt)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IShoppingStore implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl IShoppingStore for LarderEngine {
    // ── shopping lists ──

    fn create_shopping_list(&self, new: &NewShoppingList) -> LarderResult<ShoppingList> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::shopping_lists::insert_list(conn, new, &stamp))
    }

    fn get_shopping_list(&self, id: i64) -> LarderResult<ShoppingList> {
        self.db.with_reader(|conn| {
            queries::shopping_lists::get_list(conn, id, Visibility::Live)?
                .ok_or(LarderError::NotFound { entity: "shopping_list", id })
        })
    }

    fn get_shopping_list_including_deleted(&self, id: i64) -> LarderResult<ShoppingList> {
        self.db.with_reader(|conn| {
            queries::shopping_lists::get_list(conn, id, Visibility::IncludeDeleted)?
                .ok_or(LarderError::NotFound { entity: "shopping_list", id })
        })
    }

    fn list_shopping_lists(&self) -> LarderResult<Vec<ShoppingList>> {
        self.db.with_reader(queries::shopping_lists::list_lists)
    }

    fn list_active_shopping_lists(&self) -> LarderResult<Vec<ShoppingList>> {
        self.db.with_reader(queries::shopping_lists::list_active_lists)
    }

    fn update_shopping_list(
        &self,
        id: i64,
        fields: &NewShoppingList,
    ) -> LarderResult<ShoppingList> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::shopping_lists::update_list(conn, id, fields, &stamp))
    }

    fn soft_delete_shopping_list(&self, id: i64) -> LarderResult<()> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::shopping_lists::soft_delete_list(conn, id, &stamp))
    }

    // ── items ──

    fn add_item(
        &self,
        list_id: i64,
        new: &NewShoppingListItem,
    ) -> LarderResult<ShoppingListItem> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::shopping_items::insert_item(conn, list_id, new, &stamp))
    }

    fn get_item(&self, id: i64) -> LarderResult<ShoppingListItem> {
        self.db.with_reader(|conn| {
            queries::shopping_items::get_item(conn, id, Visibility::Live)?
                .ok_or(LarderError::NotFound { entity: "shopping_list_item", id })
        })
    }

    fn get_item_including_deleted(&self, id: i64) -> LarderResult<ShoppingListItem> {
        self.db.with_reader(|conn| {
            queries::shopping_items::get_item(conn, id, Visibility::IncludeDeleted)?
                .ok_or(LarderError::NotFound { entity: "shopping_list_item", id })
        })
    }

    fn list_items(&self, list_id: i64) -> LarderResult<Vec<ShoppingListItem>> {
        self.db
            .with_reader(|conn| queries::shopping_items::list_items(conn, list_id))
    }

    fn update_item(
        &self,
        id: i64,
        fields: &NewShoppingListItem,
    ) -> LarderResult<ShoppingListItem> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::shopping_items::update_item(conn, id, fields, &stamp))
    }

    fn soft_delete_item(&self, id: i64) -> LarderResult<()> {
        let stamp = AuditStamp::now();
        self.db
            .with_writer(|conn| queries::shopping_items::soft_delete_item(conn, id, &stamp))
    }

    fn set_item_purchased(&self, id: i64, purchased: bool) -> LarderResult<ShoppingListItem> {
        let stamp = AuditStamp::now();
        self.db.with_writer(|conn| {
            queries::shopping_items::set_item_purchased(conn, id, purchased, &stamp)
        })
    }

    // ── replenishment planner ──

    fn auto_add_low_stock(&self, list_id: i64) -> LarderResult<Vec<ShoppingListItem>> {
        let stamp = AuditStamp::now();
        let items = self.db.with_writer(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| to_storage_err(e.to_string()))?;
            let items = queries::shopping_items::auto_add_low_stock(&tx, list_id, &stamp)?;
            tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
            Ok(items)
        })?;
        if !items.is_empty() {
            tracing::info!(list_id, created = items.len(), "auto-added low-stock items");
        }
        Ok(items)
    }
}
