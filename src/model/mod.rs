//! Data models for the seeded tables.
//!
//! - ChecklistCategory
//! - KbItem (knowledge-base article)
//! - CodeItem (code example or testing snippet)

pub mod category;
pub mod item;

pub use category::{ChecklistCategory, NewCategory, PREREQUISITE_CATEGORIES, WEB_CATEGORY_ID};
pub use item::{CodeItem, KbItem, NewCodeItem, NewKbItem};
