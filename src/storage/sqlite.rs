//! SQLite storage implementation.
//!
//! [`SqliteStorage`] owns the single connection used for one seeding call.
//! Writes go through [`SqliteStorage::mutate`], so every inserted row is its
//! own committed transaction.

use crate::error::{Error, Result};
use crate::model::{CodeItem, KbItem, NewCategory, NewCodeItem, NewKbItem, ChecklistCategory};
use crate::storage::schema::{configure_connection, create_schema, drop_schema, table_exists};
use rusqlite::{Connection, OptionalExtension, Transaction};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::trace;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Row counts for the seeded tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub checklist_categories: usize,
    pub kb_items: usize,
    pub code_items: usize,
}

/// Rows removed by [`SqliteStorage::delete_items`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeletedItems {
    pub kb_items: usize,
    pub code_items: usize,
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// The file is created if missing. No schema is applied: creating and
    /// dropping the schema is the seeder's job.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation in its own IMMEDIATE transaction.
    ///
    /// Commits when the closure succeeds. The transaction rolls back when it
    /// is dropped on the error path.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let result = f(&tx)?;

        tx.commit()?;
        trace!(op, "Committed");

        Ok(result)
    }

    // ==================
    // Schema Lifecycle
    // ==================

    /// Create all schema objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails.
    pub fn create_schema(&mut self) -> Result<()> {
        self.mutate("create_schema", |tx| Ok(create_schema(tx)?))
    }

    /// Drop all schema objects, returning how many were dropped.
    ///
    /// Foreign-key enforcement is switched off for the duration and restored
    /// afterwards, whether or not the drop succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if any object cannot be dropped. Nothing is dropped
    /// in that case.
    pub fn drop_schema(&mut self) -> Result<usize> {
        self.conn.pragma_update(None, "foreign_keys", "OFF")?;
        let result = self.mutate("drop_schema", |tx| Ok(drop_schema(tx)?));
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        result
    }

    /// Whether the prerequisite categories have been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn is_seeded(&self) -> Result<bool> {
        if !table_exists(&self.conn, "checklist_categories")? {
            return Ok(false);
        }
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM checklist_categories", [], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Count rows in the seeded tables. Missing tables count as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn counts(&self) -> Result<TableCounts> {
        Ok(TableCounts {
            checklist_categories: self.count_rows("checklist_categories")?,
            kb_items: self.count_rows("kb_items")?,
            code_items: self.count_rows("code_items")?,
        })
    }

    fn count_rows(&self, table: &str) -> Result<usize> {
        if !table_exists(&self.conn, table)? {
            return Ok(0);
        }
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Run a batch of SQL in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; nothing is applied then.
    pub fn execute_batch(&mut self, op: &str, sql: &str) -> Result<()> {
        self.mutate(op, |tx| Ok(tx.execute_batch(sql)?))
    }

    // ===================
    // Category Operations
    // ===================

    /// Insert a checklist category, returning its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_category(&mut self, category: &NewCategory) -> Result<i64> {
        self.mutate("insert_category", |tx| {
            tx.execute(
                "INSERT INTO checklist_categories (name, description) VALUES (?1, ?2)",
                rusqlite::params![category.name, category.description],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    /// List checklist categories by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_categories(&self) -> Result<Vec<ChecklistCategory>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description FROM checklist_categories ORDER BY id ASC")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ChecklistCategory {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>();

        rows.map_err(Error::from)
    }

    // =========================
    // Knowledge-Base Operations
    // =========================

    /// Whether a knowledge-base item with this external id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn kb_item_exists(&self, kb_id: &str) -> Result<bool> {
        Ok(self
            .conn
            .prepare("SELECT 1 FROM kb_items WHERE kb_id = ?1")?
            .exists([kb_id])?)
    }

    /// Insert a knowledge-base item, returning its row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including on a duplicate `kb_id`.
    pub fn insert_kb_item(&mut self, item: &NewKbItem) -> Result<i64> {
        self.mutate("insert_kb_item", |tx| {
            tx.execute(
                "INSERT INTO kb_items (title, content, kb_id, checklist_category_id)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    item.title,
                    item.content,
                    item.kb_id,
                    item.checklist_category_id
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    /// Get a knowledge-base item by external id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_kb_item(&self, kb_id: &str) -> Result<Option<KbItem>> {
        let item = self
            .conn
            .query_row(
                "SELECT id, title, content, kb_id, checklist_category_id
                 FROM kb_items WHERE kb_id = ?1",
                [kb_id],
                map_kb_row,
            )
            .optional()?;
        Ok(item)
    }

    /// List knowledge-base items in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_kb_items(&self) -> Result<Vec<KbItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, kb_id, checklist_category_id
             FROM kb_items ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map([], map_kb_row)?
            .collect::<std::result::Result<Vec<_>, _>>();

        rows.map_err(Error::from)
    }

    // =====================
    // Code Item Operations
    // =====================

    /// Whether a code item with this language tag and title exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn code_item_exists(&self, code_lang: &str, title: &str) -> Result<bool> {
        Ok(self
            .conn
            .prepare("SELECT 1 FROM code_items WHERE code_lang = ?1 AND title = ?2")?
            .exists([code_lang, title])?)
    }

    /// Insert a code item, returning its row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_code_item(&mut self, item: &NewCodeItem) -> Result<i64> {
        self.mutate("insert_code_item", |tx| {
            tx.execute(
                "INSERT INTO code_items (content, title, code_lang, checklist_category_id)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    item.content,
                    item.title,
                    item.code_lang,
                    item.checklist_category_id
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    /// List code items in insertion order, optionally for one language tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_code_items(&self, code_lang: Option<&str>) -> Result<Vec<CodeItem>> {
        let map_row = |row: &rusqlite::Row| -> rusqlite::Result<CodeItem> {
            Ok(CodeItem {
                id: row.get(0)?,
                content: row.get(1)?,
                title: row.get(2)?,
                code_lang: row.get(3)?,
                checklist_category_id: row.get(4)?,
            })
        };

        let rows = if let Some(lang) = code_lang {
            let mut stmt = self.conn.prepare(
                "SELECT id, content, title, code_lang, checklist_category_id
                 FROM code_items WHERE code_lang = ?1 ORDER BY id ASC",
            )?;
            stmt.query_map([lang], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()
        } else {
            let mut stmt = self.conn.prepare(
                "SELECT id, content, title, code_lang, checklist_category_id
                 FROM code_items ORDER BY id ASC",
            )?;
            stmt.query_map([], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()
        };

        rows.map_err(Error::from)
    }

    /// Delete every knowledge-base and code item in one transaction.
    ///
    /// Categories are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if either delete fails.
    pub fn delete_items(&mut self) -> Result<DeletedItems> {
        self.mutate("delete_items", |tx| {
            let kb_items = tx.execute("DELETE FROM kb_items", [])?;
            let code_items = tx.execute("DELETE FROM code_items", [])?;
            Ok(DeletedItems {
                kb_items,
                code_items,
            })
        })
    }
}

/// Whether an error is a SQLite constraint violation (UNIQUE, FOREIGN KEY, ...).
#[must_use]
pub fn is_constraint_violation(err: &Error) -> bool {
    matches!(
        err,
        Error::Database(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn map_kb_row(row: &rusqlite::Row) -> rusqlite::Result<KbItem> {
    Ok(KbItem {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        kb_id: row.get(3)?,
        checklist_category_id: row.get(4)?,
    })
}
