//! shopping_list_items table queries plus the replenishment planner.

use rusqlite::{params, Connection};

use larder_core::entities::{NewShoppingListItem, ShoppingListItem};
use larder_core::{AuditStamp, LarderError, LarderResult, Visibility};

use crate::to_storage_err;

use super::{audit_to_json, parse_audit, shopping_lists, stored_products, templates, OptionalRow};

/// Add an item to a live list. A present template id must point at a
/// live template at assignment time.
pub fn insert_item(
    conn: &Connection,
    list_id: i64,
    new: &NewShoppingListItem,
    stamp: &AuditStamp,
) -> LarderResult<ShoppingListItem> {
    new.validate()?;
    if !shopping_lists::list_is_live(conn, list_id)? {
        return Err(LarderError::NotFound { entity: "shopping_list", id: list_id });
    }
    if let Some(template_id) = new.template_id {
        if !templates::template_is_live(conn, template_id)? {
            return Err(LarderError::InvalidReference {
                entity: "product_template",
                id: template_id,
            });
        }
    }

    conn.execute(
        "INSERT INTO shopping_list_items
             (list_id, template_id, name, brand, quantity, unit, purchased,
              extra, deleted, audit)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9)",
        params![
            list_id,
            new.template_id,
            new.name,
            new.brand,
            new.quantity,
            new.unit,
            new.purchased,
            new.extra,
            audit_to_json(stamp)?
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(ShoppingListItem {
        id: conn.last_insert_rowid(),
        list_id,
        template_id: new.template_id,
        name: new.name.clone(),
        brand: new.brand.clone(),
        quantity: new.quantity,
        unit: new.unit.clone(),
        purchased: new.purchased,
        extra: new.extra.clone(),
        deleted: false,
        audit: stamp.clone(),
    })
}

/// Get an item by id under the given visibility.
pub fn get_item(
    conn: &Connection,
    id: i64,
    visibility: Visibility,
) -> LarderResult<Option<ShoppingListItem>> {
    let sql = format!(
        "SELECT id, list_id, template_id, name, brand, quantity, unit, purchased,
                extra, deleted, audit
         FROM shopping_list_items WHERE id = ?1{}",
        visibility.predicate()
    );
    let mut stmt = conn
        .prepare_cached(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let result = stmt
        .query_row(params![id], |row| Ok(row_to_item(row)))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match result {
        Some(Ok(item)) => Ok(Some(item)),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

/// A list's live items in insertion order. Unknown list ids yield an
/// empty list.
pub fn list_items(conn: &Connection, list_id: i64) -> LarderResult<Vec<ShoppingListItem>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, list_id, template_id, name, brand, quantity, unit, purchased,
                    extra, deleted, audit
             FROM shopping_list_items WHERE list_id = ?1 AND deleted = 0 ORDER BY id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![list_id], |row| Ok(row_to_item(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut result = Vec::new();
    for row in rows {
        let item = row.map_err(|e| to_storage_err(e.to_string()))?;
        result.push(item?);
    }
    Ok(result)
}

/// Replace all caller-settable fields of a live item. The item keeps its
/// list; a present template id is re-checked against live templates.
pub fn update_item(
    conn: &Connection,
    id: i64,
    fields: &NewShoppingListItem,
    stamp: &AuditStamp,
) -> LarderResult<ShoppingListItem> {
    fields.validate()?;
    if let Some(template_id) = fields.template_id {
        if !templates::template_is_live(conn, template_id)? {
            return Err(LarderError::InvalidReference {
                entity: "product_template",
                id: template_id,
            });
        }
    }

    let rows = conn
        .execute(
            "UPDATE shopping_list_items
             SET template_id = ?2, name = ?3, brand = ?4, quantity = ?5, unit = ?6,
                 purchased = ?7, extra = ?8, audit = ?9
             WHERE id = ?1 AND deleted = 0",
            params![
                id,
                fields.template_id,
                fields.name,
                fields.brand,
                fields.quantity,
                fields.unit,
                fields.purchased,
                fields.extra,
                audit_to_json(stamp)?
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if rows == 0 {
        return Err(LarderError::NotFound { entity: "shopping_list_item", id });
    }

    get_item(conn, id, Visibility::Live)?
        .ok_or(LarderError::NotFound { entity: "shopping_list_item", id })
}

/// Set the soft-delete flag on a live item.
pub fn soft_delete_item(conn: &Connection, id: i64, stamp: &AuditStamp) -> LarderResult<()> {
    let rows = conn
        .execute(
            "UPDATE shopping_list_items SET deleted = 1, audit = ?2
             WHERE id = ?1 AND deleted = 0",
            params![id, audit_to_json(stamp)?],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if rows == 0 {
        return Err(LarderError::NotFound { entity: "shopping_list_item", id });
    }
    Ok(())
}

/// Flip the purchased flag, refreshing the audit stamp.
pub fn set_item_purchased(
    conn: &Connection,
    id: i64,
    purchased: bool,
    stamp: &AuditStamp,
) -> LarderResult<ShoppingListItem> {
    let rows = conn
        .execute(
            "UPDATE shopping_list_items SET purchased = ?2, audit = ?3
             WHERE id = ?1 AND deleted = 0",
            params![id, purchased, audit_to_json(stamp)?],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if rows == 0 {
        return Err(LarderError::NotFound { entity: "shopping_list_item", id });
    }

    get_item(conn, id, Visibility::Live)?
        .ok_or(LarderError::NotFound { entity: "shopping_list_item", id })
}

/// True when the list already carries an open (unpurchased, live) item
/// for the template.
pub fn has_open_item(conn: &Connection, list_id: i64, template_id: i64) -> LarderResult<bool> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT 1 FROM shopping_list_items
             WHERE list_id = ?1 AND template_id = ?2 AND purchased = 0 AND deleted = 0",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    stmt.exists(params![list_id, template_id])
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Add one item per current shortage to the list, skipping templates
/// that already have an open item there. Item quantity is the shortfall;
/// the unit falls back to "pcs" when the template has no default. The
/// planner's inputs are recorded in the item's extra payload.
///
/// Runs on the caller's connection; the engine wraps the whole sweep in
/// one transaction.
pub fn auto_add_low_stock(
    conn: &Connection,
    list_id: i64,
    stamp: &AuditStamp,
) -> LarderResult<Vec<ShoppingListItem>> {
    if !shopping_lists::list_is_live(conn, list_id)? {
        return Err(LarderError::NotFound { entity: "shopping_list", id: list_id });
    }

    let mut created = Vec::new();
    for entry in stored_products::low_stock(conn)? {
        if has_open_item(conn, list_id, entry.template.id)? {
            continue;
        }
        let unit = entry
            .template
            .default_unit
            .clone()
            .unwrap_or_else(|| "pcs".to_string());
        let context = serde_json::json!({
            "auto_added_reason": "minimum_quantity",
            "auto_added_at": stamp.last_modified.to_rfc3339(),
            "current_stock": entry.current_stock,
            "minimum_quantity": entry.template.minimum_quantity,
        });
        let new = NewShoppingListItem {
            template_id: Some(entry.template.id),
            name: entry.template.name.clone(),
            brand: entry.template.brand.clone(),
            quantity: entry.shortfall,
            unit,
            purchased: false,
            extra: Some(context.to_string()),
        };
        created.push(insert_item(conn, list_id, &new, stamp)?);
    }
    Ok(created)
}

/// Parse a row from the shopping_list_items table.
fn row_to_item(row: &rusqlite::Row<'_>) -> LarderResult<ShoppingListItem> {
    let audit_json: String = row.get(10).map_err(|e| to_storage_err(e.to_string()))?;

    Ok(ShoppingListItem {
        id: row.get(0).map_err(|e| to_storage_err(e.to_string()))?,
        list_id: row.get(1).map_err(|e| to_storage_err(e.to_string()))?,
        template_id: row.get(2).map_err(|e| to_storage_err(e.to_string()))?,
        name: row.get(3).map_err(|e| to_storage_err(e.to_string()))?,
        brand: row.get(4).map_err(|e| to_storage_err(e.to_string()))?,
        quantity: row.get(5).map_err(|e| to_storage_err(e.to_string()))?,
        unit: row.get(6).map_err(|e| to_storage_err(e.to_string()))?,
        purchased: row.get::<_, i64>(7).map_err(|e| to_storage_err(e.to_string()))? != 0,
        extra: row.get(8).map_err(|e| to_storage_err(e.to_string()))?,
        deleted: row.get::<_, i64>(9).map_err(|e| to_storage_err(e.to_string()))? != 0,
        audit: parse_audit(&audit_json)?,
    })
}
