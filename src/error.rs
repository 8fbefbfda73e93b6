//! Error types for the SKF seeder.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 4=validation, 5=duplicate, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for seeder operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts can match on either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    DatabaseError,

    // Validation (exit 4)
    MalformedFilename,

    // Duplicate (exit 5)
    DuplicateItem,

    // Config (exit 7)
    ConfigError,
    ResourceDirError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::MalformedFilename => "MALFORMED_FILENAME",
            Self::DuplicateItem => "DUPLICATE_ITEM",
            Self::ConfigError => "CONFIG_ERROR",
            Self::ResourceDirError => "RESOURCE_DIR_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::DatabaseError => 2,
            Self::MalformedFilename => 4,
            Self::DuplicateItem => 5,
            Self::ConfigError | Self::ResourceDirError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur while seeding or maintaining the database.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: no database at {path}")]
    NotInitialized { path: PathBuf },

    #[error("Knowledge-base item {kb_id:?} already exists (from {})", path.display())]
    DuplicateKnowledgeBaseItem { kb_id: String, path: PathBuf },

    #[error("Malformed markdown filename {}: expected at least 4 '-' separated segments, found {segments}", path.display())]
    MalformedFilename { path: PathBuf, segments: usize },

    #[error("Cannot read content directory {}: {source}", path.display())]
    ResourceDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized { .. } => ErrorCode::NotInitialized,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::DuplicateKnowledgeBaseItem { .. } => ErrorCode::DuplicateItem,
            Self::MalformedFilename { .. } => ErrorCode::MalformedFilename,
            Self::ResourceDir { .. } => ErrorCode::ResourceDirError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized { .. } => {
                Some("Run `skf-seed init` to create and seed the database".to_string())
            }

            Self::DuplicateKnowledgeBaseItem { kb_id, .. } => Some(format!(
                "Two knowledge-base files share the id '{kb_id}'. Rename one, then run `skf-seed clean`."
            )),

            Self::MalformedFilename { .. } => Some(
                "Markdown files must be named <id>-<x>-<y>-<title>[-...].md, e.g. 1-asvs-kb-Cross_site_scripting.md"
                    .to_string(),
            ),

            Self::ResourceDir { .. } => Some(
                "Point --root (or SKF_ROOT) at the directory containing markdown/".to_string(),
            ),

            Self::Database(_) | Self::Io(_) | Self::Json(_) | Self::Config(_) | Self::Other(_) => {
                None
            }
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
