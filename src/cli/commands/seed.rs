//! Lifecycle command implementations: clear, init, clean, update.
//!
//! Each command opens its own [`SqliteStorage`] and [`Seeder`], runs one
//! operation, and prints either a JSON payload or a short human summary.

use crate::config::{ensure_db_dir, load_layout, resolve_db_path, resolve_resource_root};
use crate::error::{Error, Result};
use crate::seed::{InitOutcome, InitialData, LoadReport, SeedReport, Seeder, UpdateReport};
use crate::storage::SqliteStorage;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Paths shared by every lifecycle command.
#[derive(Debug, Clone, Copy)]
pub struct SeedArgs<'a> {
    pub db: Option<&'a Path>,
    pub root: Option<&'a Path>,
    pub layout: Option<&'a Path>,
}

#[derive(Serialize)]
struct ClearOutput<'a> {
    database: &'a Path,
    dropped: usize,
}

#[derive(Serialize)]
struct SeedOutput<'a, T: Serialize> {
    database: &'a Path,
    #[serde(flatten)]
    result: &'a T,
}

/// Open (creating if needed) the database for a seeding command.
fn open_storage(db: Option<&Path>, testing: bool, must_exist: bool) -> Result<(SqliteStorage, PathBuf)> {
    let db_path = resolve_db_path(db, testing)
        .ok_or_else(|| Error::Config("Could not determine database location".to_string()))?;

    if must_exist && !db_path.exists() {
        return Err(Error::NotInitialized { path: db_path });
    }

    ensure_db_dir(&db_path)?;
    let storage = SqliteStorage::open(&db_path)?;
    Ok((storage, db_path))
}

fn print_json<T: Serialize>(database: &Path, result: &T) -> Result<()> {
    let output = SeedOutput { database, result };
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

/// Execute `clear`.
///
/// A missing database is created empty, so there is nothing to drop.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the drop fails.
pub fn execute_clear(args: SeedArgs<'_>, json: bool) -> Result<()> {
    let (mut storage, db_path) = open_storage(args.db, false, false)?;

    // clear never reads markdown, the root only has to resolve
    let root = args.root.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let dropped = Seeder::new(&mut storage, root, crate::config::SeedLayout::default()).clear()?;

    if json {
        let output = ClearOutput {
            database: &db_path,
            dropped,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Cleared database ({dropped} schema objects dropped)");
        println!("  Database: {}", db_path.display());
    }

    Ok(())
}

/// Execute `init`.
///
/// # Errors
///
/// Returns an error if configuration cannot be resolved or seeding fails.
pub fn execute_init(args: SeedArgs<'_>, testing: bool, json: bool) -> Result<()> {
    let root = resolve_resource_root(args.root)?;
    let layout = load_layout(args.layout, &root)?;
    let (mut storage, db_path) = open_storage(args.db, testing, false)?;

    let outcome = Seeder::new(&mut storage, &root, layout).init(testing)?;

    if json {
        return print_json(&db_path, &outcome);
    }

    match outcome {
        InitOutcome::Initialized(report) => print_seed_report("Initialized", &db_path, &report),
        InitOutcome::AlreadyInitialized => {
            println!("Database already initialized, nothing to do");
            println!("  Database: {}", db_path.display());
            println!();
            println!("Run 'skf-seed clean' to rebuild it or 'skf-seed update' to reload markdown.");
        }
    }

    Ok(())
}

/// Execute `clean`.
///
/// # Errors
///
/// Returns an error if configuration cannot be resolved, the clear fails, or
/// seeding fails.
pub fn execute_clean(args: SeedArgs<'_>, testing: bool, json: bool) -> Result<()> {
    let root = resolve_resource_root(args.root)?;
    let layout = load_layout(args.layout, &root)?;
    let (mut storage, db_path) = open_storage(args.db, testing, false)?;

    let report = Seeder::new(&mut storage, &root, layout).clean(testing)?;

    if json {
        return print_json(&db_path, &report);
    }

    print_seed_report("Rebuilt", &db_path, &report);
    Ok(())
}

/// Execute `update`.
///
/// # Errors
///
/// Returns [`Error::NotInitialized`] if the database does not exist, or any
/// error raised while reloading.
pub fn execute_update(args: SeedArgs<'_>, json: bool) -> Result<()> {
    let root = resolve_resource_root(args.root)?;
    let layout = load_layout(args.layout, &root)?;
    let (mut storage, db_path) = open_storage(args.db, false, true)?;

    if !storage.is_seeded()? {
        return Err(Error::NotInitialized { path: db_path });
    }

    let report = Seeder::new(&mut storage, &root, layout).update()?;

    if json {
        return print_json(&db_path, &report);
    }

    print_update_report(&db_path, &report);
    Ok(())
}

fn print_seed_report(verb: &str, db_path: &Path, report: &SeedReport) {
    let mode = if report.testing { " (testing)" } else { "" };
    println!("{} database{mode}", verb.green().bold());
    println!("  Database: {}", db_path.display());
    println!();
    for load in &report.loads {
        print_load(load);
    }
    match &report.initial_data {
        InitialData::Applied { path } => println!("  initial data       {}", path.display()),
        InitialData::Skipped => println!("  initial data       {}", "skipped".dimmed()),
    }
}

fn print_update_report(db_path: &Path, report: &UpdateReport) {
    println!("{} database", "Updated".green().bold());
    println!("  Database: {}", db_path.display());
    println!(
        "  Removed {} knowledge-base and {} code items",
        report.deleted.kb_items, report.deleted.code_items
    );
    println!();
    for load in &report.loads {
        print_load(load);
    }
}

fn print_load(load: &LoadReport) {
    let name = load.loader.display_name();
    if load.skipped.is_empty() {
        println!("  {name:<18} {} inserted", load.inserted);
        return;
    }

    println!(
        "  {name:<18} {} inserted, {}",
        load.inserted,
        format!("{} skipped", load.skipped.len()).yellow()
    );
    for skipped in &load.skipped {
        println!("    {} ({})", skipped.path.display(), skipped.reason);
    }
}
