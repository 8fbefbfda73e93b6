//! Initial-data collaborator.
//!
//! Runs once at the end of `init` and `clean`, after the markdown loaders,
//! to fill the tables the seeder does not derive from markdown (checklist
//! types, privileges, users, ...).

use crate::error::Result;
use crate::seed::report::InitialData;
use crate::storage::SqliteStorage;
use std::path::{Path, PathBuf};
use tracing::info;

/// Loads the remaining fixture data.
pub trait InitialDataLoader {
    /// Populate `storage` from resources under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture cannot be read or applied.
    fn load(&self, storage: &mut SqliteStorage, root: &Path) -> Result<InitialData>;
}

/// Runs a SQL fixture file as one transaction.
///
/// A missing file is not an error.
#[derive(Debug, Clone)]
pub struct SqlFixtureLoader {
    file: PathBuf,
}

impl SqlFixtureLoader {
    /// `file` is resolved against the resource root unless absolute.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }
}

impl InitialDataLoader for SqlFixtureLoader {
    fn load(&self, storage: &mut SqliteStorage, root: &Path) -> Result<InitialData> {
        let path = root.join(&self.file);
        if !path.is_file() {
            info!(path = %path.display(), "No initial data fixture, skipping");
            return Ok(InitialData::Skipped);
        }

        let sql = std::fs::read_to_string(&path)?;
        storage.execute_batch("load_initial_data", &sql)?;
        info!(path = %path.display(), "Loaded initial data");

        Ok(InitialData::Applied { path })
    }
}

/// Does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInitialData;

impl InitialDataLoader for NoInitialData {
    fn load(&self, _storage: &mut SqliteStorage, _root: &Path) -> Result<InitialData> {
        Ok(InitialData::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_fixture_is_skipped() {
        let root = TempDir::new().unwrap();
        let mut storage = SqliteStorage::open_memory().unwrap();
        let outcome = SqlFixtureLoader::new("initial_data.sql")
            .load(&mut storage, root.path())
            .unwrap();
        assert_eq!(outcome, InitialData::Skipped);
    }

    #[test]
    fn test_fixture_is_applied() {
        let root = TempDir::new().unwrap();
        std::fs::write(
            root.path().join("initial_data.sql"),
            "INSERT INTO privileges (privilege) VALUES ('edit'), ('read');",
        )
        .unwrap();

        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.create_schema().unwrap();
        let outcome = SqlFixtureLoader::new("initial_data.sql")
            .load(&mut storage, root.path())
            .unwrap();

        assert!(matches!(outcome, InitialData::Applied { .. }));
        let count: i64 = storage
            .conn()
            .query_row("SELECT COUNT(*) FROM privileges", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
