//! Markdown corpus layout.
//!
//! Names the sub-directories each loader walks, in load order. The defaults
//! match the corpus shipped with the knowledge-base application; a JSON file
//! may override any field:
//!
//! ```json
//! { "knowledge_base_types": ["web", "mobile"] }
//! ```

use crate::error::{Error, Result};
use crate::model::PREREQUISITE_CATEGORIES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Layout file looked up in the resource root when no `--layout` is given.
pub const LAYOUT_FILE_NAME: &str = "seed.json";

/// Directory layout of the markdown corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedLayout {
    /// Knowledge-base sub-directories. Position `n` (1-based) is the
    /// checklist category id its articles link to.
    pub knowledge_base_types: Vec<String>,
    /// Code example language tags, loaded in filesystem order.
    pub code_languages: Vec<String>,
    /// Testing example groups, loaded in filename order.
    pub testing_languages: Vec<String>,
    /// SQL fixture run after the markdown loaders, relative to the root.
    pub initial_data_file: PathBuf,
}

impl Default for SeedLayout {
    fn default() -> Self {
        Self {
            // "mobile" has content on disk but is not loaded yet
            knowledge_base_types: vec!["web".to_string()],
            code_languages: [
                "asp-needs-reviewing",
                "java-needs-reviewing",
                "php-needs-reviewing",
                "flask",
                "django-needs-reviewing",
                "go-needs-reviewing",
                "ruby-needs-reviewing",
                "nodejs-express-needs-reviewing",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            testing_languages: vec!["testing".to_string()],
            initial_data_file: PathBuf::from("initial_data.sql"),
        }
    }
}

impl SeedLayout {
    /// `<root>/markdown/knowledge_base/`
    #[must_use]
    pub fn knowledge_base_dir(root: &Path) -> PathBuf {
        root.join("markdown").join("knowledge_base")
    }

    /// `<root>/markdown/code_examples/web/`
    #[must_use]
    pub fn code_examples_dir(root: &Path) -> PathBuf {
        root.join("markdown").join("code_examples").join("web")
    }

    /// Reject names that are empty or would escape their base directory, and
    /// knowledge-base types with no category to link to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first bad entry.
    pub fn validate(&self) -> Result<()> {
        if self.knowledge_base_types.len() > PREREQUISITE_CATEGORIES.len() {
            return Err(Error::Config(format!(
                "{} knowledge_base_types configured but only {} checklist categories exist",
                self.knowledge_base_types.len(),
                PREREQUISITE_CATEGORIES.len()
            )));
        }

        let groups = [
            ("knowledge_base_types", &self.knowledge_base_types),
            ("code_languages", &self.code_languages),
            ("testing_languages", &self.testing_languages),
        ];

        for (field, names) in groups {
            for name in names {
                if name.is_empty() || name == ".." || name.contains(['/', '\\']) {
                    return Err(Error::Config(format!(
                        "invalid directory name {name:?} in {field}"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Load the corpus layout.
///
/// Uses `explicit` when given (it must exist), otherwise `<root>/seed.json`
/// when present, otherwise [`SeedLayout::default`].
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON, or names
/// an invalid directory.
pub fn load_layout(explicit: Option<&Path>, root: &Path) -> Result<SeedLayout> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(root.join(LAYOUT_FILE_NAME)).filter(|p| p.is_file()),
    };

    let layout = match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading seed layout");
            let raw = std::fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("cannot read layout {}: {e}", path.display()))
            })?;
            serde_json::from_str(&raw)?
        }
        None => SeedLayout::default(),
    };

    layout.validate()?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_layout() {
        let layout = SeedLayout::default();
        assert_eq!(layout.knowledge_base_types, ["web"]);
        assert_eq!(layout.code_languages.len(), 8);
        assert_eq!(layout.code_languages[3], "flask");
        assert_eq!(layout.testing_languages, ["testing"]);
    }

    #[test]
    fn test_missing_layout_file_uses_default() {
        let root = TempDir::new().unwrap();
        let layout = load_layout(None, root.path()).unwrap();
        assert_eq!(layout, SeedLayout::default());
    }

    #[test]
    fn test_partial_layout_file_keeps_other_defaults() {
        let root = TempDir::new().unwrap();
        std::fs::write(
            root.path().join(LAYOUT_FILE_NAME),
            r#"{"knowledge_base_types": ["web", "mobile"]}"#,
        )
        .unwrap();

        let layout = load_layout(None, root.path()).unwrap();
        assert_eq!(layout.knowledge_base_types, ["web", "mobile"]);
        assert_eq!(layout.code_languages, SeedLayout::default().code_languages);
    }

    #[test]
    fn test_explicit_layout_must_exist() {
        let root = TempDir::new().unwrap();
        let result = load_layout(Some(&root.path().join("nope.json")), root.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_path_traversal() {
        let layout = SeedLayout {
            code_languages: vec!["../etc".to_string()],
            ..SeedLayout::default()
        };
        assert!(matches!(layout.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_more_kb_types_than_categories() {
        let layout = SeedLayout {
            knowledge_base_types: ["web", "mobile", "custom", "iot"].map(String::from).to_vec(),
            ..SeedLayout::default()
        };
        assert!(matches!(layout.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_json_is_json_error() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join(LAYOUT_FILE_NAME), "{not json").unwrap();
        assert!(matches!(
            load_layout(None, root.path()),
            Err(Error::Json(_))
        ));
    }
}
