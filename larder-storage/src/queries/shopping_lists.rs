//! shopping_lists table queries.

use rusqlite::{params, Connection};

use larder_core::entities::{NewShoppingList, ShoppingList};
use larder_core::{AuditStamp, LarderError, LarderResult, Visibility};

use crate::to_storage_err;

use super::{audit_to_json, parse_audit, OptionalRow};

/// Insert a new list and return the stored row.
pub fn insert_list(
    conn: &Connection,
    new: &NewShoppingList,
    stamp: &AuditStamp,
) -> LarderResult<ShoppingList> {
    new.validate()?;
    conn.execute(
        "INSERT INTO shopping_lists (name, active, extra, deleted, audit)
         VALUES (?1, ?2, ?3, 0, ?4)",
        params![new.name, new.active, new.extra, audit_to_json(stamp)?],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(ShoppingList {
        id: conn.last_insert_rowid(),
        name: new.name.clone(),
        active: new.active,
        extra: new.extra.clone(),
        deleted: false,
        audit: stamp.clone(),
    })
}

/// Get a list by id under the given visibility.
pub fn get_list(
    conn: &Connection,
    id: i64,
    visibility: Visibility,
) -> LarderResult<Option<ShoppingList>> {
    let sql = format!(
        "SELECT id, name, active, extra, deleted, audit
         FROM shopping_lists WHERE id = ?1{}",
        visibility.predicate()
    );
    let mut stmt = conn
        .prepare_cached(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let result = stmt
        .query_row(params![id], |row| Ok(row_to_list(row)))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match result {
        Some(Ok(list)) => Ok(Some(list)),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

/// All live lists, ordered by id.
pub fn list_lists(conn: &Connection) -> LarderResult<Vec<ShoppingList>> {
    query_lists(
        conn,
        "SELECT id, name, active, extra, deleted, audit
         FROM shopping_lists WHERE deleted = 0 ORDER BY id",
    )
}

/// Live lists with the active flag set.
pub fn list_active_lists(conn: &Connection) -> LarderResult<Vec<ShoppingList>> {
    query_lists(
        conn,
        "SELECT id, name, active, extra, deleted, audit
         FROM shopping_lists WHERE deleted = 0 AND active = 1 ORDER BY id",
    )
}

/// Replace all caller-settable fields of a live list.
pub fn update_list(
    conn: &Connection,
    id: i64,
    fields: &NewShoppingList,
    stamp: &AuditStamp,
) -> LarderResult<ShoppingList> {
    fields.validate()?;
    let rows = conn
        .execute(
            "UPDATE shopping_lists SET name = ?2, active = ?3, extra = ?4, audit = ?5
             WHERE id = ?1 AND deleted = 0",
            params![id, fields.name, fields.active, fields.extra, audit_to_json(stamp)?],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if rows == 0 {
        return Err(LarderError::NotFound { entity: "shopping_list", id });
    }

    Ok(ShoppingList {
        id,
        name: fields.name.clone(),
        active: fields.active,
        extra: fields.extra.clone(),
        deleted: false,
        audit: stamp.clone(),
    })
}

/// Set the soft-delete flag on a live list. Items stay in place.
pub fn soft_delete_list(conn: &Connection, id: i64, stamp: &AuditStamp) -> LarderResult<()> {
    let rows = conn
        .execute(
            "UPDATE shopping_lists SET deleted = 1, audit = ?2
             WHERE id = ?1 AND deleted = 0",
            params![id, audit_to_json(stamp)?],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if rows == 0 {
        return Err(LarderError::NotFound { entity: "shopping_list", id });
    }
    Ok(())
}

/// True when the id refers to a live list.
pub fn list_is_live(conn: &Connection, id: i64) -> LarderResult<bool> {
    let mut stmt = conn
        .prepare_cached("SELECT 1 FROM shopping_lists WHERE id = ?1 AND deleted = 0")
        .map_err(|e| to_storage_err(e.to_string()))?;
    stmt.exists(params![id])
        .map_err(|e| to_storage_err(e.to_string()))
}

fn query_lists(conn: &Connection, sql: &str) -> LarderResult<Vec<ShoppingList>> {
    let mut stmt = conn
        .prepare_cached(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| Ok(row_to_list(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut result = Vec::new();
    for row in rows {
        let list = row.map_err(|e| to_storage_err(e.to_string()))?;
        result.push(list?);
    }
    Ok(result)
}

/// Parse a row from the shopping_lists table.
fn row_to_list(row: &rusqlite::Row<'_>) -> LarderResult<ShoppingList> {
    let audit_json: String = row.get(5).map_err(|e| to_storage_err(e.to_string()))?;

    Ok(ShoppingList {
        id: row.get(0).map_err(|e| to_storage_err(e.to_string()))?,
        name: row.get(1).map_err(|e| to_storage_err(e.to_string()))?,
        active: row.get::<_, i64>(2).map_err(|e| to_storage_err(e.to_string()))? != 0,
        extra: row.get(3).map_err(|e| to_storage_err(e.to_string()))?,
        deleted: row.get::<_, i64>(4).map_err(|e| to_storage_err(e.to_string()))? != 0,
        audit: parse_audit(&audit_json)?,
    })
}
