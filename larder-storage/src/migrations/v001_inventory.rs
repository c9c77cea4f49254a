//! v001: core inventory tables — locations, templates, stored products,
//! movements.

use rusqlite::Connection;

use larder_core::LarderResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> LarderResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS storage_locations (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            name    TEXT NOT NULL,
            kind    TEXT NOT NULL DEFAULT 'other',
            extra   TEXT,
            deleted INTEGER NOT NULL DEFAULT 0,
            audit   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS product_templates (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            brand            TEXT,
            name             TEXT NOT NULL,
            barcode          TEXT,
            kind             TEXT NOT NULL DEFAULT 'other',
            minimum_quantity REAL NOT NULL DEFAULT 0,
            default_unit     TEXT,
            extra            TEXT,
            deleted          INTEGER NOT NULL DEFAULT 0,
            audit            TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_templates_brand_name
            ON product_templates(COALESCE(brand, ''), name) WHERE deleted = 0;

        CREATE TABLE IF NOT EXISTS stored_products (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            template_id   INTEGER NOT NULL REFERENCES product_templates(id),
            location_id   INTEGER NOT NULL REFERENCES storage_locations(id),
            quantity      REAL NOT NULL DEFAULT 0,
            unit          TEXT NOT NULL,
            expiry_date   TEXT,
            purchase_date TEXT,
            extra         TEXT,
            deleted       INTEGER NOT NULL DEFAULT 0,
            audit         TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_stored_products_template
            ON stored_products(template_id) WHERE deleted = 0;
        CREATE INDEX IF NOT EXISTS idx_stored_products_location
            ON stored_products(location_id) WHERE deleted = 0;
        CREATE INDEX IF NOT EXISTS idx_stored_products_expiry
            ON stored_products(expiry_date) WHERE deleted = 0;

        CREATE TABLE IF NOT EXISTS product_movements (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            stored_product_id INTEGER NOT NULL REFERENCES stored_products(id),
            kind              TEXT NOT NULL,
            from_location_id  INTEGER,
            to_location_id    INTEGER,
            quantity          REAL NOT NULL,
            unit              TEXT NOT NULL,
            context           TEXT,
            deleted           INTEGER NOT NULL DEFAULT 0,
            audit             TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_movements_product
            ON product_movements(stored_product_id, id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
