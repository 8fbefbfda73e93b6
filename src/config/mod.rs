//! Configuration management.
//!
//! This module provides functions for resolving the database path, the
//! resource root holding the markdown corpus, and the directory layout.
//!
//! # Architecture
//!
//! - **Database**: `~/.skf/data/skf.db`, or `~/.skf/test/skf.db` in testing mode
//! - **Resources**: `<root>/markdown/...`, root from `--root`, `SKF_ROOT` or the
//!   current directory
//! - **Layout**: which sub-directories to load, see [`SeedLayout`]

mod layout;

pub use layout::{load_layout, SeedLayout, LAYOUT_FILE_NAME};

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Get the global seeder directory location (`~/.skf/`).
#[must_use]
pub fn global_skf_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".skf"))
}

/// Check if test mode is enabled through the environment.
///
/// Enabled by setting `SKF_TEST_DB=1` (or any non-empty value other than
/// `0`/`false`).
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("SKF_TEST_DB")
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && value.to_lowercase() != "false"
}

/// Get the test database path (`~/.skf/test/skf.db`).
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_skf_dir().map(|dir| dir.join("test").join("skf.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided (`--db` / `SKF_DB`), use it directly
/// 2. `testing` flag or `SKF_TEST_DB` → isolated test database
/// 3. Global location: `~/.skf/data/skf.db`
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>, testing: bool) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if testing || is_test_mode() {
        return test_db_path();
    }

    global_skf_dir().map(|dir| dir.join("data").join("skf.db"))
}

/// Resolve the resource root containing `markdown/`.
///
/// Priority:
/// 1. `explicit_root` (`--root` / `SKF_ROOT`)
/// 2. The current directory
///
/// # Errors
///
/// Returns [`Error::Config`] if the resolved root is not a directory.
pub fn resolve_resource_root(explicit_root: Option<&Path>) -> Result<PathBuf> {
    let root = match explicit_root {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()?,
    };

    if !root.is_dir() {
        return Err(Error::Config(format!(
            "resource root {} is not a directory",
            root.display()
        )));
    }

    Ok(root)
}

/// Make sure the parent directory of the database file exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
