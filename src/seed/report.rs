//! Outcomes reported by the seeding operations.

use crate::storage::DeletedItems;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The loaders run by the seeder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Loader {
    Prerequisites,
    CodeExamples,
    TestingExamples,
    KnowledgeBase,
}

impl Loader {
    /// Human readable name used in log lines and output.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Prerequisites => "prerequisites",
            Self::CodeExamples => "code-examples",
            Self::TestingExamples => "testing-examples",
            Self::KnowledgeBase => "knowledge-base",
        }
    }
}

/// Result of handling one markdown file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Row written and committed, with its row id.
    Inserted(i64),
    /// A row with the same key already existed, nothing written.
    SkippedDuplicate,
    /// The insert hit a constraint violation, nothing written.
    Failed(String),
}

/// A file that did not produce a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub path: PathBuf,
    pub reason: String,
}

/// Per-loader summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loader: Loader,
    pub inserted: usize,
    pub skipped: Vec<SkippedItem>,
}

impl LoadReport {
    #[must_use]
    pub fn new(loader: Loader) -> Self {
        Self {
            loader,
            inserted: 0,
            skipped: Vec::new(),
        }
    }

    /// Fold one file's outcome into the report.
    pub fn record(&mut self, path: &Path, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Inserted(id) => {
                debug!(loader = self.loader.display_name(), id, path = %path.display(), "Inserted");
                self.inserted += 1;
            }
            ItemOutcome::SkippedDuplicate => {
                warn!(loader = self.loader.display_name(), path = %path.display(), "Skipping duplicate item");
                self.skipped.push(SkippedItem {
                    path: path.to_path_buf(),
                    reason: "duplicate".to_string(),
                });
            }
            ItemOutcome::Failed(reason) => {
                warn!(loader = self.loader.display_name(), path = %path.display(), %reason, "Skipping item");
                self.skipped.push(SkippedItem {
                    path: path.to_path_buf(),
                    reason,
                });
            }
        }
    }
}

/// What the initial-data collaborator did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum InitialData {
    Applied { path: PathBuf },
    Skipped,
}

/// Summary of a full seeding run (`init` or `clean`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub testing: bool,
    pub loads: Vec<LoadReport>,
    pub initial_data: InitialData,
}

impl SeedReport {
    /// Report for one loader, if it ran.
    #[must_use]
    pub fn load(&self, loader: Loader) -> Option<&LoadReport> {
        self.loads.iter().find(|l| l.loader == loader)
    }

    /// Rows inserted across all loaders.
    #[must_use]
    pub fn inserted(&self) -> usize {
        self.loads.iter().map(|l| l.inserted).sum()
    }
}

/// Result of [`crate::seed::Seeder::init`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum InitOutcome {
    Initialized(SeedReport),
    AlreadyInitialized,
}

/// Summary of [`crate::seed::Seeder::update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    pub deleted: DeletedItems,
    pub loads: Vec<LoadReport>,
}
