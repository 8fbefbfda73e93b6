//! Knowledge-base and code item models.

use serde::{Deserialize, Serialize};

/// A knowledge-base article ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewKbItem {
    pub title: String,
    /// Escaped markdown body.
    pub content: String,
    /// External identifier parsed from the filename (e.g. "14").
    pub kb_id: String,
    pub checklist_category_id: Option<i64>,
}

impl NewKbItem {
    /// Build an item linked to the category at `category_index`.
    ///
    /// The introductory article (external id "1") never links to a category.
    #[must_use]
    pub fn new(title: String, content: String, kb_id: String, category_index: i64) -> Self {
        let checklist_category_id = if kb_id == "1" {
            None
        } else {
            Some(category_index)
        };

        Self {
            title,
            content,
            kb_id,
            checklist_category_id,
        }
    }
}

/// A persisted knowledge-base article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbItem {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub kb_id: String,
    pub checklist_category_id: Option<i64>,
}

/// A code example ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCodeItem {
    /// Escaped markdown body.
    pub content: String,
    pub title: String,
    /// Language or framework tag, i.e. the source sub-directory name.
    pub code_lang: String,
    pub checklist_category_id: i64,
}

/// A persisted code example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeItem {
    pub id: i64,
    pub content: String,
    pub title: String,
    pub code_lang: String,
    pub checklist_category_id: i64,
}
