//! product_movements table queries — the append-only ledger plus the
//! composite move operation.

use rusqlite::{params, Connection};

use larder_core::entities::{
    validate_quantity, MovementKind, NewMovement, ProductMovement, StoredProduct,
};
use larder_core::traits::MoveReceipt;
use larder_core::{AuditStamp, LarderError, LarderResult, Visibility};

use crate::to_storage_err;

use super::{audit_to_json, locations, parse_audit, stored_products};

/// Append a movement. The stored product must be live; from/to location
/// ids are historical annotations and pass through unchecked.
pub fn insert_movement(
    conn: &Connection,
    new: &NewMovement,
    stamp: &AuditStamp,
) -> LarderResult<ProductMovement> {
    new.validate()?;
    if !stored_products::product_is_live(conn, new.stored_product_id)? {
        return Err(LarderError::InvalidReference {
            entity: "stored_product",
            id: new.stored_product_id,
        });
    }

    conn.execute(
        "INSERT INTO product_movements
             (stored_product_id, kind, from_location_id, to_location_id, quantity,
              unit, context, deleted, audit)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)",
        params![
            new.stored_product_id,
            new.kind.as_str(),
            new.from_location_id,
            new.to_location_id,
            new.quantity,
            new.unit,
            new.context,
            audit_to_json(stamp)?
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(ProductMovement {
        id: conn.last_insert_rowid(),
        stored_product_id: new.stored_product_id,
        kind: new.kind,
        from_location_id: new.from_location_id,
        to_location_id: new.to_location_id,
        quantity: new.quantity,
        unit: new.unit.clone(),
        context: new.context.clone(),
        deleted: false,
        audit: stamp.clone(),
    })
}

/// Movement history for one stored product, oldest first. Soft-deleting
/// the product does not hide its history; unknown ids yield an empty
/// list.
pub fn list_movements(
    conn: &Connection,
    stored_product_id: i64,
) -> LarderResult<Vec<ProductMovement>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, stored_product_id, kind, from_location_id, to_location_id,
                    quantity, unit, context, deleted, audit
             FROM product_movements
             WHERE stored_product_id = ?1 AND deleted = 0
             ORDER BY id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![stored_product_id], |row| Ok(row_to_movement(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut result = Vec::new();
    for row in rows {
        let movement = row.map_err(|e| to_storage_err(e.to_string()))?;
        result.push(movement?);
    }
    Ok(result)
}

/// Relocate a live stored product, optionally setting a new quantity,
/// and append the `Moved` movement that records the change.
///
/// Runs the update and the append on the caller's connection; the
/// engine wraps the pair in one transaction.
pub fn move_product(
    conn: &Connection,
    stored_product_id: i64,
    to_location_id: i64,
    new_quantity: Option<f64>,
    stamp: &AuditStamp,
) -> LarderResult<MoveReceipt> {
    let product = stored_products::get_product(conn, stored_product_id, Visibility::Live)?
        .ok_or(LarderError::NotFound {
            entity: "stored_product",
            id: stored_product_id,
        })?;
    if !locations::location_is_live(conn, to_location_id)? {
        return Err(LarderError::InvalidReference {
            entity: "storage_location",
            id: to_location_id,
        });
    }
    if let Some(quantity) = new_quantity {
        validate_quantity(quantity)?;
    }
    let quantity = new_quantity.unwrap_or(product.quantity);

    conn.execute(
        "UPDATE stored_products SET location_id = ?2, quantity = ?3, audit = ?4
         WHERE id = ?1 AND deleted = 0",
        params![stored_product_id, to_location_id, quantity, audit_to_json(stamp)?],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let context = serde_json::json!({
        "reason": "manual move",
        "old_quantity": product.quantity,
        "new_quantity": quantity,
    });
    let movement = insert_movement(
        conn,
        &NewMovement {
            stored_product_id,
            kind: MovementKind::Moved,
            from_location_id: Some(product.location_id),
            to_location_id: Some(to_location_id),
            quantity,
            unit: product.unit.clone(),
            context: Some(context.to_string()),
        },
        stamp,
    )?;

    let product = StoredProduct {
        location_id: to_location_id,
        quantity,
        audit: stamp.clone(),
        ..product
    };
    Ok(MoveReceipt { product, movement })
}

/// Parse a row from the product_movements table.
fn row_to_movement(row: &rusqlite::Row<'_>) -> LarderResult<ProductMovement> {
    let kind_str: String = row.get(2).map_err(|e| to_storage_err(e.to_string()))?;
    let kind = MovementKind::parse(&kind_str)
        .ok_or_else(|| to_storage_err(format!("unknown movement kind '{kind_str}'")))?;
    let audit_json: String = row.get(9).map_err(|e| to_storage_err(e.to_string()))?;

    Ok(ProductMovement {
        id: row.get(0).map_err(|e| to_storage_err(e.to_string()))?,
        stored_product_id: row.get(1).map_err(|e| to_storage_err(e.to_string()))?,
        kind,
        from_location_id: row.get(3).map_err(|e| to_storage_err(e.to_string()))?,
        to_location_id: row.get(4).map_err(|e| to_storage_err(e.to_string()))?,
        quantity: row.get(5).map_err(|e| to_storage_err(e.to_string()))?,
        unit: row.get(6).map_err(|e| to_storage_err(e.to_string()))?,
        context: row.get(7).map_err(|e| to_storage_err(e.to_string()))?,
        deleted: row.get::<_, i64>(8).map_err(|e| to_storage_err(e.to_string()))? != 0,
        audit: parse_audit(&audit_json)?,
    })
}
