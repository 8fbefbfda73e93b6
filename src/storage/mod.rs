//! SQLite storage layer for the seeder.
//!
//! This module provides the persistence layer using SQLite with:
//! - A single owned connection per seeding call
//! - One committed transaction per inserted row
//! - Whole-schema creation and teardown
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main SQLite storage implementation

pub mod schema;
pub mod sqlite;

pub use sqlite::{is_constraint_violation, DeletedItems, SqliteStorage, TableCounts};
