//! Markdown loaders.
//!
//! Each loader walks its configured sub-directories in order and commits one
//! row per markdown file. The knowledge-base loader treats a duplicate
//! external id as fatal; the code loaders skip duplicates and keep going.

use crate::config::SeedLayout;
use crate::error::{Error, Result};
use crate::markdown::{escape_code_content, escape_kb_content, list_markdown_files};
use crate::model::{NewCodeItem, NewKbItem, PREREQUISITE_CATEGORIES, WEB_CATEGORY_ID};
use crate::seed::report::{ItemOutcome, LoadReport, Loader};
use crate::storage::{is_constraint_violation, SqliteStorage};
use std::path::Path;
use tracing::{debug, info};

/// Insert the fixed checklist categories.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub fn load_prerequisites(storage: &mut SqliteStorage) -> Result<LoadReport> {
    let mut report = LoadReport::new(Loader::Prerequisites);

    for category in &PREREQUISITE_CATEGORIES {
        let id = storage.insert_category(category)?;
        debug!(id, name = category.name, "Inserted checklist category");
        report.inserted += 1;
    }

    info!("Initialized the prerequisites.");
    Ok(report)
}

/// Load code examples for each language tag under
/// `<root>/markdown/code_examples/web/`.
///
/// `sorted` orders each directory by filename; otherwise files are taken in
/// the order the filesystem lists them.
///
/// # Errors
///
/// Returns an error if a directory cannot be listed, a filename is
/// malformed, a file cannot be read, or storage fails for a reason other
/// than a duplicate.
pub fn load_code_group(
    storage: &mut SqliteStorage,
    root: &Path,
    loader: Loader,
    languages: &[String],
    sorted: bool,
) -> Result<LoadReport> {
    let base = SeedLayout::code_examples_dir(root);
    let mut report = LoadReport::new(loader);

    for lang in languages {
        for file in list_markdown_files(&base.join(lang), sorted)? {
            let content = escape_code_content(&file.read_content()?);
            let item = NewCodeItem {
                content,
                title: file.name.title,
                code_lang: lang.clone(),
                checklist_category_id: WEB_CATEGORY_ID,
            };

            let outcome = insert_code_item(storage, &item)?;
            report.record(&file.path, outcome);
        }
    }

    info!(
        inserted = report.inserted,
        skipped = report.skipped.len(),
        "Initialized the markdown {}.",
        loader.display_name()
    );
    Ok(report)
}

fn insert_code_item(storage: &mut SqliteStorage, item: &NewCodeItem) -> Result<ItemOutcome> {
    if storage.code_item_exists(&item.code_lang, &item.title)? {
        return Ok(ItemOutcome::SkippedDuplicate);
    }

    match storage.insert_code_item(item) {
        Ok(id) => Ok(ItemOutcome::Inserted(id)),
        Err(e) if is_constraint_violation(&e) => Ok(ItemOutcome::Failed(e.to_string())),
        Err(e) => Err(e),
    }
}

/// Load knowledge-base articles for each type under
/// `<root>/markdown/knowledge_base/`.
///
/// Articles link to the checklist category whose id is the 1-based position
/// of their type in `types`, except the article with external id "1".
///
/// # Errors
///
/// Returns [`Error::DuplicateKnowledgeBaseItem`] on the first external id
/// seen twice; rows committed before it stay. Otherwise fails like
/// [`load_code_group`].
pub fn load_knowledge_base(
    storage: &mut SqliteStorage,
    root: &Path,
    types: &[String],
) -> Result<LoadReport> {
    let base = SeedLayout::knowledge_base_dir(root);
    let mut report = LoadReport::new(Loader::KnowledgeBase);

    for (position, kb_type) in types.iter().enumerate() {
        let category_index = i64::try_from(position + 1)
            .map_err(|_| Error::Config(format!("too many knowledge_base_types ({position})")))?;

        for file in list_markdown_files(&base.join(kb_type), false)? {
            if storage.kb_item_exists(&file.name.external_id)? {
                return Err(Error::DuplicateKnowledgeBaseItem {
                    kb_id: file.name.external_id,
                    path: file.path,
                });
            }

            let content = escape_kb_content(&file.read_content()?);
            let item = NewKbItem::new(
                file.name.title,
                content,
                file.name.external_id,
                category_index,
            );

            let id = storage.insert_kb_item(&item)?;
            report.record(&file.path, ItemOutcome::Inserted(id));
        }
    }

    info!(inserted = report.inserted, "Initialized the markdown knowledge-base.");
    Ok(report)
}
