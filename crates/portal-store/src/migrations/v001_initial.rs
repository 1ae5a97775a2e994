//! v001 -- Initial schema creation.
//!
//! Creates the collection registry, the record table shared by every
//! collection, and the single-row session slot.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Collection registry: one row per initialised collection
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS collections (
    name           TEXT PRIMARY KEY NOT NULL,  -- e.g. 'users'
    schema_version INTEGER NOT NULL,           -- record body format
    version        INTEGER NOT NULL,           -- bumped on every save
    updated_at     TEXT NOT NULL               -- RFC-3339
);

-- ----------------------------------------------------------------
-- Records: self-describing JSON bodies keyed by their id
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS records (
    collection TEXT NOT NULL,
    position   INTEGER NOT NULL,               -- order within the collection
    id         TEXT NOT NULL,
    body       TEXT NOT NULL,                  -- JSON

    PRIMARY KEY (collection, id),
    FOREIGN KEY (collection) REFERENCES collections(name) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_records_collection_position
    ON records(collection, position);

-- ----------------------------------------------------------------
-- Persisted session subject (at most one)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS session (
    id         INTEGER PRIMARY KEY CHECK (id = 1),
    body       TEXT NOT NULL,                  -- JSON of the signed-in user
    created_at TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
