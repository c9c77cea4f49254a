//! storage_locations table queries.

use rusqlite::{params, Connection};

use larder_core::entities::{LocationKind, NewStorageLocation, StorageLocation};
use larder_core::{AuditStamp, LarderError, LarderResult, Visibility};

use crate::to_storage_err;

use super::{audit_to_json, parse_audit, OptionalRow};

/// Insert a new location and return the stored row.
pub fn insert_location(
    conn: &Connection,
    new: &NewStorageLocation,
    stamp: &AuditStamp,
) -> LarderResult<StorageLocation> {
    new.validate()?;
    conn.execute(
        "INSERT INTO storage_locations (name, kind, extra, deleted, audit)
         VALUES (?1, ?2, ?3, 0, ?4)",
        params![new.name, new.kind.as_str(), new.extra, audit_to_json(stamp)?],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(StorageLocation {
        id: conn.last_insert_rowid(),
        name: new.name.clone(),
        kind: new.kind,
        extra: new.extra.clone(),
        deleted: false,
        audit: stamp.clone(),
    })
}

/// Get a location by id under the given visibility.
pub fn get_location(
    conn: &Connection,
    id: i64,
    visibility: Visibility,
) -> LarderResult<Option<StorageLocation>> {
    let sql = format!(
        "SELECT id, name, kind, extra, deleted, audit
         FROM storage_locations WHERE id = ?1{}",
        visibility.predicate()
    );
    let mut stmt = conn
        .prepare_cached(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let result = stmt
        .query_row(params![id], |row| Ok(row_to_location(row)))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match result {
        Some(Ok(location)) => Ok(Some(location)),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

/// All live locations, ordered by id.
pub fn list_locations(conn: &Connection) -> LarderResult<Vec<StorageLocation>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, name, kind, extra, deleted, audit
             FROM storage_locations WHERE deleted = 0 ORDER BY id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| Ok(row_to_location(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut result = Vec::new();
    for row in rows {
        let location = row.map_err(|e| to_storage_err(e.to_string()))?;
        result.push(location?);
    }
    Ok(result)
}

/// Replace all caller-settable fields of a live location.
pub fn update_location(
    conn: &Connection,
    id: i64,
    fields: &NewStorageLocation,
    stamp: &AuditStamp,
) -> LarderResult<StorageLocation> {
    fields.validate()?;
    let rows = conn
        .execute(
            "UPDATE storage_locations SET name = ?2, kind = ?3, extra = ?4, audit = ?5
             WHERE id = ?1 AND deleted = 0",
            params![
                id,
                fields.name,
                fields.kind.as_str(),
                fields.extra,
                audit_to_json(stamp)?
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if rows == 0 {
        return Err(LarderError::NotFound { entity: "storage_location", id });
    }

    Ok(StorageLocation {
        id,
        name: fields.name.clone(),
        kind: fields.kind,
        extra: fields.extra.clone(),
        deleted: false,
        audit: stamp.clone(),
    })
}

/// Set the soft-delete flag on a live location.
pub fn soft_delete_location(
    conn: &Connection,
    id: i64,
    stamp: &AuditStamp,
) -> LarderResult<()> {
    let rows = conn
        .execute(
            "UPDATE storage_locations SET deleted = 1, audit = ?2
             WHERE id = ?1 AND deleted = 0",
            params![id, audit_to_json(stamp)?],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if rows == 0 {
        return Err(LarderError::NotFound { entity: "storage_location", id });
    }
    Ok(())
}

/// True when the id refers to a live location.
pub fn location_is_live(conn: &Connection, id: i64) -> LarderResult<bool> {
    let mut stmt = conn
        .prepare_cached("SELECT 1 FROM storage_locations WHERE id = ?1 AND deleted = 0")
        .map_err(|e| to_storage_err(e.to_string()))?;
    stmt.exists(params![id])
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Parse a row from the storage_locations table.
fn row_to_location(row: &rusqlite::Row<'_>) -> LarderResult<StorageLocation> {
    let kind_str: String = row.get(2).map_err(|e| to_storage_err(e.to_string()))?;
    let kind = LocationKind::parse(&kind_str)
        .ok_or_else(|| to_storage_err(format!("unknown location kind '{kind_str}'")))?;
    let audit_json: String = row.get(5).map_err(|e| to_storage_err(e.to_string()))?;

    Ok(StorageLocation {
        id: row.get(0).map_err(|e| to_storage_err(e.to_string()))?,
        name: row.get(1).map_err(|e| to_storage_err(e.to_string()))?,
        kind,
        extra: row.get(3).map_err(|e| to_storage_err(e.to_string()))?,
        deleted: row.get::<_, i64>(4).map_err(|e| to_storage_err(e.to_string()))? != 0,
        audit: parse_audit(&audit_json)?,
    })
}
