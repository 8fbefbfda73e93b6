//! Checklist category model.
//!
//! Categories group knowledge-base and code items for checklist generation.
//! Three fixed rows are inserted before any markdown is loaded.

use serde::{Deserialize, Serialize};

/// Identifier of "Web applications", the first prerequisite row.
///
/// Every code and testing example links to it.
pub const WEB_CATEGORY_ID: i64 = 1;

/// A category row to insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCategory {
    pub name: &'static str,
    pub description: &'static str,
}

/// Prerequisite categories in insertion order.
///
/// Order matters: knowledge-base sub-directories link to categories by
/// their 1-based position, so "Web applications" must come first.
pub const PREREQUISITE_CATEGORIES: [NewCategory; 3] = [
    NewCategory {
        name: "Web applications",
        description: "category for web collection",
    },
    NewCategory {
        name: "Mobile applications",
        description: "category for mobile collection",
    },
    NewCategory {
        name: "Custom checklist",
        description: "category for custom checklist collection",
    },
];

/// A persisted checklist category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistCategory {
    pub id: i64,
    pub name: String,
    pub description: String,
}
