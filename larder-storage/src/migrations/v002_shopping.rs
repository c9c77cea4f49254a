//! v002: shopping lists and their items.

use rusqlite::Connection;

use larder_core::LarderResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> LarderResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS shopping_lists (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            name    TEXT NOT NULL,
            active  INTEGER NOT NULL DEFAULT 1,
            extra   TEXT,
            deleted INTEGER NOT NULL DEFAULT 0,
            audit   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS shopping_list_items (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            list_id     INTEGER NOT NULL REFERENCES shopping_lists(id),
            template_id INTEGER REFERENCES product_templates(id),
            name        TEXT NOT NULL,
            brand       TEXT,
            quantity    REAL NOT NULL DEFAULT 1,
            unit        TEXT NOT NULL,
            purchased   INTEGER NOT NULL DEFAULT 0,
            extra       TEXT,
            deleted     INTEGER NOT NULL DEFAULT 0,
            audit       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_items_list
            ON shopping_list_items(list_id) WHERE deleted = 0;
        CREATE INDEX IF NOT EXISTS idx_items_list_template
            ON shopping_list_items(list_id, template_id) WHERE deleted = 0;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
