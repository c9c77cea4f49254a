//! stored_products table queries — CRUD plus stock aggregation.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use larder_core::entities::{NewStoredProduct, StoredProduct};
use larder_core::traits::LowStockEntry;
use larder_core::{AuditStamp, LarderError, LarderResult, Visibility};

use crate::to_storage_err;

use super::{audit_to_json, locations, parse_audit, parse_dt, templates, OptionalRow};

/// Insert a new stored product. Both references must point at live rows.
pub fn insert_product(
    conn: &Connection,
    new: &NewStoredProduct,
    stamp: &AuditStamp,
) -> LarderResult<StoredProduct> {
    new.validate()?;
    if !templates::template_is_live(conn, new.template_id)? {
        return Err(LarderError::InvalidReference {
            entity: "product_template",
            id: new.template_id,
        });
    }
    if !locations::location_is_live(conn, new.location_id)? {
        return Err(LarderError::InvalidReference {
            entity: "storage_location",
            id: new.location_id,
        });
    }

    conn.execute(
        "INSERT INTO stored_products
             (template_id, location_id, quantity, unit, expiry_date, purchase_date,
              extra, deleted, audit)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)",
        params![
            new.template_id,
            new.location_id,
            new.quantity,
            new.unit,
            new.expiry_date.map(|d| d.to_rfc3339()),
            new.purchase_date.map(|d| d.to_rfc3339()),
            new.extra,
            audit_to_json(stamp)?
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(StoredProduct {
        id: conn.last_insert_rowid(),
        template_id: new.template_id,
        location_id: new.location_id,
        quantity: new.quantity,
        unit: new.unit.clone(),
        expiry_date: new.expiry_date,
        purchase_date: new.purchase_date,
        extra: new.extra.clone(),
        deleted: false,
        audit: stamp.clone(),
    })
}

/// Get a stored product by id under the given visibility.
pub fn get_product(
    conn: &Connection,
    id: i64,
    visibility: Visibility,
) -> LarderResult<Option<StoredProduct>> {
    let sql = format!(
        "SELECT id, template_id, location_id, quantity, unit, expiry_date,
                purchase_date, extra, deleted, audit
         FROM stored_products WHERE id = ?1{}",
        visibility.predicate()
    );
    let mut stmt = conn
        .prepare_cached(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let result = stmt
        .query_row(params![id], |row| Ok(row_to_product(row)))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match result {
        Some(Ok(product)) => Ok(Some(product)),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

/// All live stored products, ordered by id.
pub fn list_products(conn: &Connection) -> LarderResult<Vec<StoredProduct>> {
    query_products(
        conn,
        "SELECT id, template_id, location_id, quantity, unit, expiry_date,
                purchase_date, extra, deleted, audit
         FROM stored_products WHERE deleted = 0 ORDER BY id",
        params![],
    )
}

/// Live stored products at one location. Unknown ids yield an empty list.
pub fn list_products_at(conn: &Connection, location_id: i64) -> LarderResult<Vec<StoredProduct>> {
    query_products(
        conn,
        "SELECT id, template_id, location_id, quantity, unit, expiry_date,
                purchase_date, extra, deleted, audit
         FROM stored_products WHERE location_id = ?1 AND deleted = 0 ORDER BY id",
        params![location_id],
    )
}

/// Live stored products referencing one template.
pub fn list_products_for_template(
    conn: &Connection,
    template_id: i64,
) -> LarderResult<Vec<StoredProduct>> {
    query_products(
        conn,
        "SELECT id, template_id, location_id, quantity, unit, expiry_date,
                purchase_date, extra, deleted, audit
         FROM stored_products WHERE template_id = ?1 AND deleted = 0 ORDER BY id",
        params![template_id],
    )
}

/// Live stored products expiring at or before `cutoff`, soonest first.
///
/// Already-expired products are included; rows without an expiry date
/// are not. RFC 3339 text in UTC compares correctly as a string.
pub fn list_expiring_before(
    conn: &Connection,
    cutoff: DateTime<Utc>,
) -> LarderResult<Vec<StoredProduct>> {
    query_products(
        conn,
        "SELECT id, template_id, location_id, quantity, unit, expiry_date,
                purchase_date, extra, deleted, audit
         FROM stored_products
         WHERE deleted = 0 AND expiry_date IS NOT NULL AND expiry_date <= ?1
         ORDER BY expiry_date, id",
        params![cutoff.to_rfc3339()],
    )
}

/// Replace all caller-settable fields of a live stored product,
/// re-checking both references.
pub fn update_product(
    conn: &Connection,
    id: i64,
    fields: &NewStoredProduct,
    stamp: &AuditStamp,
) -> LarderResult<StoredProduct> {
    fields.validate()?;
    if !templates::template_is_live(conn, fields.template_id)? {
        return Err(LarderError::InvalidReference {
            entity: "product_template",
            id: fields.template_id,
        });
    }
    if !locations::location_is_live(conn, fields.location_id)? {
        return Err(LarderError::InvalidReference {
            entity: "storage_location",
            id: fields.location_id,
        });
    }

    let rows = conn
        .execute(
            "UPDATE stored_products
             SET template_id = ?2, location_id = ?3, quantity = ?4, unit = ?5,
                 expiry_date = ?6, purchase_date = ?7, extra = ?8, audit = ?9
             WHERE id = ?1 AND deleted = 0",
            params![
                id,
                fields.template_id,
                fields.location_id,
                fields.quantity,
                fields.unit,
                fields.expiry_date.map(|d| d.to_rfc3339()),
                fields.purchase_date.map(|d| d.to_rfc3339()),
                fields.extra,
                audit_to_json(stamp)?
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if rows == 0 {
        return Err(LarderError::NotFound { entity: "stored_product", id });
    }

    Ok(StoredProduct {
        id,
        template_id: fields.template_id,
        location_id: fields.location_id,
        quantity: fields.quantity,
        unit: fields.unit.clone(),
        expiry_date: fields.expiry_date,
        purchase_date: fields.purchase_date,
        extra: fields.extra.clone(),
        deleted: false,
        audit: stamp.clone(),
    })
}

/// Set the soft-delete flag. Movement history stays in place.
pub fn soft_delete_product(conn: &Connection, id: i64, stamp: &AuditStamp) -> LarderResult<()> {
    let rows = conn
        .execute(
            "UPDATE stored_products SET deleted = 1, audit = ?2
             WHERE id = ?1 AND deleted = 0",
            params![id, audit_to_json(stamp)?],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if rows == 0 {
        return Err(LarderError::NotFound { entity: "stored_product", id });
    }
    Ok(())
}

/// True when the id refers to a live stored product.
pub fn product_is_live(conn: &Connection, id: i64) -> LarderResult<bool> {
    let mut stmt = conn
        .prepare_cached("SELECT 1 FROM stored_products WHERE id = ?1 AND deleted = 0")
        .map_err(|e| to_storage_err(e.to_string()))?;
    stmt.exists(params![id])
        .map_err(|e| to_storage_err(e.to_string()))
}

// ─── Stock aggregation ──────────────────────────────────────────────

/// Sum of live quantities for one template, computed fresh per call.
pub fn current_stock(conn: &Connection, template_id: i64) -> LarderResult<f64> {
    if !templates::template_is_live(conn, template_id)? {
        return Err(LarderError::NotFound {
            entity: "product_template",
            id: template_id,
        });
    }
    let mut stmt = conn
        .prepare_cached(
            "SELECT COALESCE(SUM(quantity), 0.0) FROM stored_products
             WHERE template_id = ?1 AND deleted = 0",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    stmt.query_row(params![template_id], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Every live template whose aggregated live stock is strictly below its
/// minimum, ordered by template id. Templates with no live stored
/// products count as stock 0.
pub fn low_stock(conn: &Connection) -> LarderResult<Vec<LowStockEntry>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT t.id, t.brand, t.name, t.barcode, t.kind, t.minimum_quantity,
                    t.default_unit, t.extra, t.deleted, t.audit,
                    COALESCE(s.stock, 0.0)
             FROM product_templates t
             LEFT JOIN (
                 SELECT template_id, SUM(quantity) AS stock
                 FROM stored_products WHERE deleted = 0
                 GROUP BY template_id
             ) s ON s.template_id = t.id
             WHERE t.deleted = 0 AND COALESCE(s.stock, 0.0) < t.minimum_quantity
             ORDER BY t.id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| {
            let stock: f64 = row.get(10)?;
            Ok((templates::row_to_template(row), stock))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut result = Vec::new();
    for row in rows {
        let (template, current_stock) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let template = template?;
        let shortfall = template.minimum_quantity - current_stock;
        result.push(LowStockEntry { template, current_stock, shortfall });
    }
    Ok(result)
}

// ─── Row mapping ────────────────────────────────────────────────────

fn query_products(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> LarderResult<Vec<StoredProduct>> {
    let mut stmt = conn
        .prepare_cached(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params, |row| Ok(row_to_product(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut result = Vec::new();
    for row in rows {
        let product = row.map_err(|e| to_storage_err(e.to_string()))?;
        result.push(product?);
    }
    Ok(result)
}

/// Parse a row from the stored_products table.
pub(crate) fn row_to_product(row: &rusqlite::Row<'_>) -> LarderResult<StoredProduct> {
    let expiry: Option<String> = row.get(5).map_err(|e| to_storage_err(e.to_string()))?;
    let purchase: Option<String> = row.get(6).map_err(|e| to_storage_err(e.to_string()))?;
    let audit_json: String = row.get(9).map_err(|e| to_storage_err(e.to_string()))?;

    Ok(StoredProduct {
        id: row.get(0).map_err(|e| to_storage_err(e.to_string()))?,
        template_id: row.get(1).map_err(|e| to_storage_err(e.to_string()))?,
        location_id: row.get(2).map_err(|e| to_storage_err(e.to_string()))?,
        quantity: row.get(3).map_err(|e| to_storage_err(e.to_string()))?,
        unit: row.get(4).map_err(|e| to_storage_err(e.to_string()))?,
        expiry_date: expiry.as_deref().map(parse_dt).transpose()?,
        purchase_date: purchase.as_deref().map(parse_dt).transpose()?,
        extra: row.get(7).map_err(|e| to_storage_err(e.to_string()))?,
        deleted: row.get::<_, i64>(8).map_err(|e| to_storage_err(e.to_string()))? != 0,
        audit: parse_audit(&audit_json)?,
    })
}
