//! `IShoppingStore` trait — shopping lists, their items, and the
//! replenishment planner.
//!
//! Maps to `larder-storage/src/queries/shopping_lists.rs` +
//! `queries/shopping_items.rs`.

use std::sync::Arc;

use crate::entities::{
    NewShoppingList, NewShoppingListItem, ShoppingList, ShoppingListItem,
};
use crate::errors::LarderResult;

// ─── Trait ───────────────────────────────────────────────────────────

/// Shopping-list CRUD plus the idempotent auto-replenishment operation.
pub trait IShoppingStore: Send + Sync {
    // ── shopping lists ──

    fn create_shopping_list(&self, new: &NewShoppingList) -> LarderResult<ShoppingList>;

    /// Get a live list. `NotFound` if absent or soft-deleted.
    fn get_shopping_list(&self, id: i64) -> LarderResult<ShoppingList>;

    /// Get a list regardless of its soft-delete flag.
    fn get_shopping_list_including_deleted(&self, id: i64) -> LarderResult<ShoppingList>;

    /// All live lists, ordered by id.
    fn list_shopping_lists(&self) -> LarderResult<Vec<ShoppingList>>;

    /// Live lists with the active flag set.
    fn list_active_shopping_lists(&self) -> LarderResult<Vec<ShoppingList>>;

    /// Full-field replace. `NotFound` if absent or soft-deleted.
    fn update_shopping_list(
        &self,
        id: i64,
        fields: &NewShoppingList,
    ) -> LarderResult<ShoppingList>;

    /// Set the soft-delete flag. Items on the list are left untouched.
    fn soft_delete_shopping_list(&self, id: i64) -> LarderResult<()>;

    // ── items ──

    /// Add an item to a live list. `NotFound` when the list is absent or
    /// soft-deleted; `InvalidReference` when a template id is given but
    /// not live at assignment time.
    fn add_item(&self, list_id: i64, new: &NewShoppingListItem)
        -> LarderResult<ShoppingListItem>;

    /// Get a live item. `NotFound` if absent or soft-deleted.
    fn get_item(&self, id: i64) -> LarderResult<ShoppingListItem>;

    /// Get an item regardless of its soft-delete flag.
    fn get_item_including_deleted(&self, id: i64) -> LarderResult<ShoppingListItem>;

    /// A list's live items in insertion order.
    fn list_items(&self, list_id: i64) -> LarderResult<Vec<ShoppingListItem>>;

    /// Full-field replace; re-checks a present template id against live
    /// templates.
    fn update_item(
        &self,
        id: i64,
        fields: &NewShoppingListItem,
    ) -> LarderResult<ShoppingListItem>;

    /// Set the soft-delete flag on an item.
    fn soft_delete_item(&self, id: i64) -> LarderResult<()>;

    /// Flip the purchased flag. Refreshes the audit stamp like any
    /// other update.
    fn set_item_purchased(&self, id: i64, purchased: bool) -> LarderResult<ShoppingListItem>;

    // ── replenishment planner ──

    /// Add one item per current shortage to the given list, skipping
    /// templates that already have an open (unpurchased, live) item
    /// there. Repeated calls with unchanged stock create nothing new.
    /// Returns the items created this call, ordered by template id.
    fn auto_add_low_stock(&self, list_id: i64) -> LarderResult<Vec<ShoppingListItem>>;
}

// ─── Arc blanket impl ───────────────────────────────────────────────

impl<T: IShoppingStore + ?Sized> IShoppingStore for Arc<T> {
    fn create_shopping_list(&self, new: &NewShoppingList) -> LarderResult<ShoppingList> {
        (**self).create_shopping_list(new)
    }
    fn get_shopping_list(&self, id: i64) -> LarderResult<ShoppingList> {
        (**self).get_shopping_list(id)
    }
    fn get_shopping_list_including_deleted(&self, id: i64) -> LarderResult<ShoppingList> {
        (**self).get_shopping_list_including_deleted(id)
    }
    fn list_shopping_lists(&self) -> LarderResult<Vec<ShoppingList>> {
        (**self).list_shopping_lists()
    }
    fn list_active_shopping_lists(&self) -> LarderResult<Vec<ShoppingList>> {
        (**self).list_active_shopping_lists()
    }
    fn update_shopping_list(
        &self,
        id: i64,
        fields: &NewShoppingList,
    ) -> LarderResult<ShoppingList> {
        (**self).update_shopping_list(id, fields)
    }
    fn soft_delete_shopping_list(&self, id: i64) -> LarderResult<()> {
        (**self).soft_delete_shopping_list(id)
    }
    fn add_item(
        &self,
        list_id: i64,
        new: &NewShoppingListItem,
    ) -> LarderResult<ShoppingListItem> {
        (**self).add_item(list_id, new)
    }
    fn get_item(&self, id: i64) -> LarderResult<ShoppingListItem> {
        (**self).get_item(id)
    }
    fn get_item_including_deleted(&self, id: i64) -> LarderResult<ShoppingListItem> {
        (**self).get_item_including_deleted(id)
    }
    fn list_items(&self, list_id: i64) -> LarderResult<Vec<ShoppingListItem>> {
        (**self).list_items(list_id)
    }
    fn update_item(
        &self,
        id: i64,
        fields: &NewShoppingListItem,
    ) -> LarderResult<ShoppingListItem> {
        (**self).update_item(id, fields)
    }
    fn soft_delete_item(&self, id: i64) -> LarderResult<()> {
        (**self).soft_delete_item(id)
    }
    fn set_item_purchased(&self, id: i64, purchased: bool) -> LarderResult<ShoppingListItem> {
        (**self).set_item_purchased(id, purchased)
    }
    fn auto_add_low_stock(&self, list_id: i64) -> LarderResult<Vec<ShoppingListItem>> {
        (**self).auto_add_low_stock(list_id)
    }
}
