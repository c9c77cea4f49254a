//! product_templates table queries.

use rusqlite::{params, Connection};

use larder_core::entities::{NewProductTemplate, ProductKind, ProductTemplate};
use larder_core::{AuditStamp, LarderError, LarderResult, Visibility};

use crate::to_storage_err;

use super::{audit_to_json, parse_audit, OptionalRow};

/// Insert a new template and return the stored row.
///
/// The (brand, name) pair is unique among live templates; a collision
/// surfaces as a conflict rather than a raw constraint failure.
pub fn insert_template(
    conn: &Connection,
    new: &NewProductTemplate,
    stamp: &AuditStamp,
) -> LarderResult<ProductTemplate> {
    new.validate()?;
    conn.execute(
        "INSERT INTO product_templates
             (brand, name, barcode, kind, minimum_quantity, default_unit, extra, deleted, audit)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)",
        params![
            new.brand,
            new.name,
            new.barcode,
            new.kind.as_str(),
            new.minimum_quantity,
            new.default_unit,
            new.extra,
            audit_to_json(stamp)?
        ],
    )
    .map_err(|e| map_unique_violation(e, &new.brand, &new.name))?;

    Ok(ProductTemplate {
        id: conn.last_insert_rowid(),
        brand: new.brand.clone(),
        name: new.name.clone(),
        barcode: new.barcode.clone(),
        kind: new.kind,
        minimum_quantity: new.minimum_quantity,
        default_unit: new.default_unit.clone(),
        extra: new.extra.clone(),
        deleted: false,
        audit: stamp.clone(),
    })
}

/// Get a template by id under the given visibility.
pub fn get_template(
    conn: &Connection,
    id: i64,
    visibility: Visibility,
) -> LarderResult<Option<ProductTemplate>> {
    let sql = format!(
        "SELECT id, brand, name, barcode, kind, minimum_quantity, default_unit,
                extra, deleted, audit
         FROM product_templates WHERE id = ?1{}",
        visibility.predicate()
    );
    let mut stmt = conn
        .prepare_cached(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let result = stmt
        .query_row(params![id], |row| Ok(row_to_template(row)))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match result {
        Some(Ok(template)) => Ok(Some(template)),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

/// All live templates, ordered by id.
pub fn list_templates(conn: &Connection) -> LarderResult<Vec<ProductTemplate>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, brand, name, barcode, kind, minimum_quantity, default_unit,
                    extra, deleted, audit
             FROM product_templates WHERE deleted = 0 ORDER BY id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| Ok(row_to_template(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut result = Vec::new();
    for row in rows {
        let template = row.map_err(|e| to_storage_err(e.to_string()))?;
        result.push(template?);
    }
    Ok(result)
}

/// Replace all caller-settable fields of a live template.
pub fn update_template(
    conn: &Connection,
    id: i64,
    fields: &NewProductTemplate,
    stamp: &AuditStamp,
) -> LarderResult<ProductTemplate> {
    fields.validate()?;
    let rows = conn
        .execute(
            "UPDATE product_templates
             SET brand = ?2, name = ?3, barcode = ?4, kind = ?5, minimum_quantity = ?6,
                 default_unit = ?7, extra = ?8, audit = ?9
             WHERE id = ?1 AND deleted = 0",
            params![
                id,
                fields.brand,
                fields.name,
                fields.barcode,
                fields.kind.as_str(),
                fields.minimum_quantity,
                fields.default_unit,
                fields.extra,
                audit_to_json(stamp)?
            ],
        )
        .map_err(|e| map_unique_violation(e, &fields.brand, &fields.name))?;

    if rows == 0 {
        return Err(LarderError::NotFound { entity: "product_template", id });
    }

    Ok(ProductTemplate {
        id,
        brand: fields.brand.clone(),
        name: fields.name.clone(),
        barcode: fields.barcode.clone(),
        kind: fields.kind,
        minimum_quantity: fields.minimum_quantity,
        default_unit: fields.default_unit.clone(),
        extra: fields.extra.clone(),
        deleted: false,
        audit: stamp.clone(),
    })
}

/// Set the soft-delete flag on a live template.
pub fn soft_delete_template(
    conn: &Connection,
    id: i64,
    stamp: &AuditStamp,
) -> LarderResult<()> {
    let rows = conn
        .execute(
            "UPDATE product_templates SET deleted = 1, audit = ?2
             WHERE id = ?1 AND deleted = 0",
            params![id, audit_to_json(stamp)?],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if rows == 0 {
        return Err(LarderError::NotFound { entity: "product_template", id });
    }
    Ok(())
}

/// True when the id refers to a live template.
pub fn template_is_live(conn: &Connection, id: i64) -> LarderResult<bool> {
    let mut stmt = conn
        .prepare_cached("SELECT 1 FROM product_templates WHERE id = ?1 AND deleted = 0")
        .map_err(|e| to_storage_err(e.to_string()))?;
    stmt.exists(params![id])
        .map_err(|e| to_storage_err(e.to_string()))
}

fn map_unique_violation(e: rusqlite::Error, brand: &Option<String>, name: &str) -> LarderError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            LarderError::Conflict {
                entity: "product_template",
                detail: format!(
                    "(brand, name) = ({}, {}) already in use by a live template",
                    brand.as_deref().unwrap_or(""),
                    name
                ),
            }
        }
        _ => to_storage_err(e.to_string()),
    }
}

/// Parse a row from the product_templates table.
pub(crate) fn row_to_template(row: &rusqlite::Row<'_>) -> LarderResult<ProductTemplate> {
    let kind_str: String = row.get(4).map_err(|e| to_storage_err(e.to_string()))?;
    let kind = ProductKind::parse(&kind_str)
        .ok_or_else(|| to_storage_err(format!("unknown product kind '{kind_str}'")))?;
    let audit_json: String = row.get(9).map_err(|e| to_storage_err(e.to_string()))?;

    Ok(ProductTemplate {
        id: row.get(0).map_err(|e| to_storage_err(e.to_string()))?,
        brand: row.get(1).map_err(|e| to_storage_err(e.to_string()))?,
        name: row.get(2).map_err(|e| to_storage_err(e.to_string()))?,
        barcode: row.get(3).map_err(|e| to_storage_err(e.to_string()))?,
        kind,
        minimum_quantity: row.get(5).map_err(|e| to_storage_err(e.to_string()))?,
        default_unit: row.get(6).map_err(|e| to_storage_err(e.to_string()))?,
        extra: row.get(7).map_err(|e| to_storage_err(e.to_string()))?,
        deleted: row.get::<_, i64>(8).map_err(|e| to_storage_err(e.to_string()))? != 0,
        audit: parse_audit(&audit_json)?,
    })
}
