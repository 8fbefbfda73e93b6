//! Database schema definitions.
//!
//! Holds the SQLite schema shared with the knowledge-base application. The
//! seeder owns three of these tables (`checklist_categories`, `kb_items`,
//! `code_items`); the others are created here so that the initial-data
//! fixtures have somewhere to land and `clear` has a whole schema to drop.

use rusqlite::{Connection, Result, Transaction};
use tracing::debug;

/// Current schema version, recorded in `schema_migrations`.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the knowledge-base database.
pub const SCHEMA_SQL: &str = r#"
-- ====================
-- Schema Version Tracking
-- ====================

CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

-- ====================
-- Seeded Tables
-- ====================

-- Checklist categories: Web / Mobile / Custom buckets
CREATE TABLE IF NOT EXISTS checklist_categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL
);

-- Knowledge-base articles, one per markdown file
CREATE TABLE IF NOT EXISTS kb_items (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    kb_id TEXT NOT NULL UNIQUE,
    checklist_category_id INTEGER,
    FOREIGN KEY (checklist_category_id) REFERENCES checklist_categories(id)
);

CREATE INDEX IF NOT EXISTS idx_kb_items_category ON kb_items(checklist_category_id);

-- Code examples, one per markdown file per language tag
CREATE TABLE IF NOT EXISTS code_items (
    id INTEGER PRIMARY KEY,
    content TEXT NOT NULL,
    title TEXT NOT NULL,
    code_lang TEXT NOT NULL,
    checklist_category_id INTEGER NOT NULL,
    UNIQUE (code_lang, title),
    FOREIGN KEY (checklist_category_id) REFERENCES checklist_categories(id)
);

CREATE INDEX IF NOT EXISTS idx_code_items_lang ON code_items(code_lang);

-- ====================
-- Application Tables (populated by initial data)
-- ====================

CREATE TABLE IF NOT EXISTS checklist_types (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    visibility INTEGER NOT NULL DEFAULT 1,
    checklist_category_id INTEGER,
    FOREIGN KEY (checklist_category_id) REFERENCES checklist_categories(id)
);

-- Checklist requirements, optionally pointing at a knowledge-base article
CREATE TABLE IF NOT EXISTS checklist_kb (
    id INTEGER PRIMARY KEY,
    checklist_id TEXT NOT NULL,
    content TEXT NOT NULL,
    checklist_type INTEGER NOT NULL,
    kb_id INTEGER,
    include_always INTEGER NOT NULL DEFAULT 0,
    cwe INTEGER,
    FOREIGN KEY (checklist_type) REFERENCES checklist_types(id) ON DELETE CASCADE,
    FOREIGN KEY (kb_id) REFERENCES kb_items(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_checklist_kb_type ON checklist_kb(checklist_type);

CREATE TABLE IF NOT EXISTS privileges (
    id INTEGER PRIMARY KEY,
    privilege TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS user_groups (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    owner_id INTEGER,
    created_at INTEGER
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    privilege_id INTEGER,
    user_name TEXT UNIQUE,
    email TEXT UNIQUE,
    password TEXT,
    access_token TEXT,
    activated INTEGER NOT NULL DEFAULT 0,
    access INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (privilege_id) REFERENCES privileges(id)
);
"#;

/// Set connection pragmas.
///
/// Called on every open. Foreign keys are enforced so category links must
/// point at existing rows.
///
/// # Errors
///
/// Returns an error if a pragma cannot be set.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    Ok(())
}

/// Create every schema object and record the schema version.
///
/// Idempotent: all statements use `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails.
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![
            format!("v{CURRENT_SCHEMA_VERSION}"),
            chrono::Utc::now().timestamp_millis()
        ],
    )?;

    Ok(())
}

/// Drop every user-defined schema object.
///
/// Not limited to the tables in [`SCHEMA_SQL`]: anything the application
/// added to the database goes too. Triggers and views are dropped before
/// tables; indexes go with their tables.
///
/// Foreign-key enforcement must be off on the connection, otherwise dropping
/// a referenced table can fail on its implicit `DELETE`.
///
/// # Errors
///
/// Returns an error if a schema object cannot be dropped.
pub fn drop_schema(tx: &Transaction) -> Result<usize> {
    let objects: Vec<(String, String)> = tx
        .prepare(
            "SELECT type, name FROM sqlite_master
             WHERE type IN ('trigger', 'view', 'table') AND name NOT LIKE 'sqlite_%'
             ORDER BY CASE type WHEN 'trigger' THEN 0 WHEN 'view' THEN 1 ELSE 2 END, name",
        )?
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<_>>()?;

    for (kind, name) in &objects {
        debug!(kind = kind.as_str(), name = name.as_str(), "Dropping schema object");
        let sql = format!(
            "DROP {} IF EXISTS \"{}\"",
            kind.to_uppercase(),
            name.replace('"', "\"\"")
        );
        tx.execute(&sql, [])?;
    }

    Ok(objects.len())
}

/// Check if a table exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?
        .exists([table])
}
