//! Status command implementation.

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::{SqliteStorage, TableCounts};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Output for status command.
#[derive(Serialize)]
struct StatusOutput {
    database: PathBuf,
    seeded: bool,
    counts: TableCounts,
    code_languages: Vec<LanguageCount>,
}

#[derive(Serialize)]
struct LanguageCount {
    code_lang: String,
    count: usize,
}

/// Execute status command.
///
/// # Errors
///
/// Returns [`Error::NotInitialized`] if the database file does not exist.
pub fn execute(db_path: Option<&Path>, json: bool) -> Result<()> {
    let db_path = resolve_db_path(db_path, false)
        .ok_or_else(|| Error::Config("Could not determine database location".to_string()))?;

    if !db_path.exists() {
        return Err(Error::NotInitialized { path: db_path });
    }

    let storage = SqliteStorage::open(&db_path)?;
    let seeded = storage.is_seeded()?;
    let counts = storage.counts()?;
    let code_languages = if counts.code_items > 0 {
        language_counts(&storage)?
    } else {
        Vec::new()
    };

    if json {
        let output = StatusOutput {
            database: db_path,
            seeded,
            counts,
            code_languages,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("SKF Database Status");
    println!("===================");
    println!();
    println!("Database: {}", db_path.display());
    if seeded {
        println!("State:    {}", "seeded".green());
    } else {
        println!("State:    {}", "not seeded".yellow());
    }
    println!();
    println!("Checklist categories: {}", counts.checklist_categories);
    println!("Knowledge-base items: {}", counts.kb_items);
    println!("Code items:           {}", counts.code_items);
    for lang in &code_languages {
        println!("  {:<32} {}", lang.code_lang, lang.count);
    }

    if !seeded {
        println!();
        println!("Seed it with: skf-seed init");
    }

    Ok(())
}

fn language_counts(storage: &SqliteStorage) -> Result<Vec<LanguageCount>> {
    let mut stmt = storage.conn().prepare(
        "SELECT code_lang, COUNT(*) FROM code_items GROUP BY code_lang ORDER BY code_lang ASC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let count: i64 = row.get(1)?;
            Ok(LanguageCount {
                code_lang: row.get(0)?,
                count: usize::try_from(count).unwrap_or(0),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>();

    rows.map_err(Error::from)
}
