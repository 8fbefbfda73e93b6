//! Database seeding and lifecycle operations.
//!
//! [`Seeder`] borrows one [`SqliteStorage`] for the duration of a call and
//! exposes the four lifecycle operations:
//!
//! | Operation | Schema            | Loaders run                                   |
//! |-----------|-------------------|-----------------------------------------------|
//! | `clear`   | dropped           | none                                          |
//! | `init`    | created if absent | all, skipped when already seeded              |
//! | `clean`   | dropped, created  | all                                           |
//! | `update`  | kept              | code examples, knowledge base                 |
//!
//! "All" is prerequisites, code examples, testing examples, knowledge base,
//! then the initial-data collaborator, in that order.
//!
//! # Submodules
//!
//! - [`loaders`] - Per-directory markdown ingestion
//! - [`initial_data`] - Fixture collaborator run after the loaders
//! - [`report`] - Outcome types

pub mod initial_data;
pub mod loaders;
pub mod report;

pub use initial_data::{InitialDataLoader, NoInitialData, SqlFixtureLoader};
pub use report::{
    InitOutcome, InitialData, ItemOutcome, LoadReport, Loader, SeedReport, SkippedItem,
    UpdateReport,
};

use crate::config::SeedLayout;
use crate::error::Result;
use crate::storage::SqliteStorage;
use std::path::PathBuf;
use tracing::{error, info};

/// Seeds and maintains the knowledge-base database.
pub struct Seeder<'a> {
    storage: &'a mut SqliteStorage,
    root: PathBuf,
    layout: SeedLayout,
    initial_data: Box<dyn InitialDataLoader>,
}

impl<'a> Seeder<'a> {
    /// Create a seeder over `storage`, reading markdown from `root`.
    ///
    /// The initial-data collaborator defaults to a [`SqlFixtureLoader`] for
    /// the layout's `initial_data_file`.
    pub fn new(storage: &'a mut SqliteStorage, root: impl Into<PathBuf>, layout: SeedLayout) -> Self {
        let initial_data = Box::new(SqlFixtureLoader::new(layout.initial_data_file.clone()));
        Self {
            storage,
            root: root.into(),
            layout,
            initial_data,
        }
    }

    /// Replace the initial-data collaborator.
    #[must_use]
    pub fn with_initial_data(mut self, loader: impl InitialDataLoader + 'static) -> Self {
        self.initial_data = Box::new(loader);
        self
    }

    /// Drop every schema object, returning how many were dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the drop fails; the transaction is rolled back.
    pub fn clear(&mut self) -> Result<usize> {
        info!("Clearing the database");
        self.storage.drop_schema().inspect_err(|e| {
            error!(error = %e, "Error occurred clearing the database");
        })
    }

    /// Create and seed the database unless it is already seeded.
    ///
    /// A database counts as seeded once it holds checklist categories. Any
    /// failure during seeding is returned; rows committed before it stay.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by schema creation, a loader, or the
    /// initial-data collaborator.
    pub fn init(&mut self, testing: bool) -> Result<InitOutcome> {
        if self.storage.is_seeded()? {
            info!("Database is already initialized, nothing to do");
            return Ok(InitOutcome::AlreadyInitialized);
        }

        info!(testing, "Initializing the database");
        self.seed(testing).map(InitOutcome::Initialized)
    }

    /// Clear, then recreate and reseed the database.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by `clear` or by seeding.
    pub fn clean(&mut self, testing: bool) -> Result<SeedReport> {
        info!(testing, "Clean and initializing the database");
        self.clear()?;
        self.seed(testing)
    }

    /// Replace knowledge-base and code example rows from the markdown on disk.
    ///
    /// Categories are kept. Testing examples are deleted with the other code
    /// items and NOT reloaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails or a loader fails.
    pub fn update(&mut self) -> Result<UpdateReport> {
        info!("Updating the database");
        let deleted = self.storage.delete_items()?;
        info!(
            kb_items = deleted.kb_items,
            code_items = deleted.code_items,
            "Deleted knowledge-base and code items"
        );

        let loads = vec![self.load_code_examples()?, self.load_knowledge_base()?];
        Ok(UpdateReport { deleted, loads })
    }

    /// Insert the fixed checklist categories.
    ///
    /// # Errors
    ///
    /// Returns an error if an insert fails.
    pub fn load_prerequisites(&mut self) -> Result<LoadReport> {
        loaders::load_prerequisites(self.storage)
    }

    /// Load the per-language code examples.
    ///
    /// # Errors
    ///
    /// See [`loaders::load_code_group`].
    pub fn load_code_examples(&mut self) -> Result<LoadReport> {
        loaders::load_code_group(
            self.storage,
            &self.root,
            Loader::CodeExamples,
            &self.layout.code_languages,
            false,
        )
    }

    /// Load the testing examples, in filename order.
    ///
    /// # Errors
    ///
    /// See [`loaders::load_code_group`].
    pub fn load_testing_examples(&mut self) -> Result<LoadReport> {
        loaders::load_code_group(
            self.storage,
            &self.root,
            Loader::TestingExamples,
            &self.layout.testing_languages,
            true,
        )
    }

    /// Load the knowledge-base articles.
    ///
    /// # Errors
    ///
    /// See [`loaders::load_knowledge_base`].
    pub fn load_knowledge_base(&mut self) -> Result<LoadReport> {
        loaders::load_knowledge_base(self.storage, &self.root, &self.layout.knowledge_base_types)
    }

    fn seed(&mut self, testing: bool) -> Result<SeedReport> {
        self.storage.create_schema()?;

        let loads = vec![
            self.load_prerequisites()?,
            self.load_code_examples()?,
            self.load_testing_examples()?,
            self.load_knowledge_base()?,
        ];
        let initial_data = self.initial_data.load(self.storage, &self.root)?;

        Ok(SeedReport {
            testing,
            loads,
            initial_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::WEB_CATEGORY_ID;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Markdown corpus under a temp root.
    struct Corpus {
        dir: TempDir,
    }

    impl Corpus {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        /// Empty directories for every configured group.
        fn with_default_dirs(self) -> Self {
            let layout = SeedLayout::default();
            for kb_type in &layout.knowledge_base_types {
                fs::create_dir_all(SeedLayout::knowledge_base_dir(self.root()).join(kb_type)).unwrap();
            }
            for lang in layout.code_languages.iter().chain(&layout.testing_languages) {
                fs::create_dir_all(SeedLayout::code_examples_dir(self.root()).join(lang)).unwrap();
            }
            self
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn kb(&self, kb_type: &str, name: &str, content: &str) -> &Self {
            let dir = SeedLayout::knowledge_base_dir(self.root()).join(kb_type);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(name), content).unwrap();
            self
        }

        fn code(&self, lang: &str, name: &str, content: &str) -> &Self {
            let dir = SeedLayout::code_examples_dir(self.root()).join(lang);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(name), content).unwrap();
            self
        }

        fn remove_kb(&self, kb_type: &str, name: &str) {
            fs::remove_file(SeedLayout::knowledge_base_dir(self.root()).join(kb_type).join(name))
                .unwrap();
        }
    }

    fn sample_corpus() -> Corpus {
        let corpus = Corpus::new().with_default_dirs();
        corpus
            .kb("web", "1-asvs-kb-Introduction-web.md", "Welcome, it's the intro")
            .kb("web", "14-asvs-kb-Cross_site_scripting-web.md", "Don't trust 'input'")
            .code("flask", "1-code-flask-CSRF_protection-x.md", "# CSRF\n- use tokens")
            .code("go-needs-reviewing", "2-code-go-SQL_injection-x.md", "db.Query('x')")
            .code("testing", "2-test-web-Second_test-x.md", "second")
            .code("testing", "1-test-web-First_test-x.md", "first");
        corpus
    }

    fn titles(storage: &SqliteStorage, lang: &str) -> Vec<String> {
        storage
            .list_code_items(Some(lang))
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect()
    }

    #[test]
    fn test_init_seeds_everything() {
        let corpus = sample_corpus();
        let mut storage = SqliteStorage::open_memory().unwrap();

        let outcome = Seeder::new(&mut storage, corpus.root(), SeedLayout::default())
            .init(false)
            .unwrap();
        let InitOutcome::Initialized(report) = outcome else {
            panic!("expected Initialized, got {outcome:?}");
        };

        assert_eq!(report.load(Loader::Prerequisites).unwrap().inserted, 3);
        assert_eq!(report.load(Loader::CodeExamples).unwrap().inserted, 2);
        assert_eq!(report.load(Loader::TestingExamples).unwrap().inserted, 2);
        assert_eq!(report.load(Loader::KnowledgeBase).unwrap().inserted, 2);
        assert_eq!(report.initial_data, InitialData::Skipped);
        assert_eq!(report.inserted(), 9);

        let counts = storage.counts().unwrap();
        assert_eq!(counts.checklist_categories, 3);
        assert_eq!(counts.kb_items, 2);
        assert_eq!(counts.code_items, 4);
    }

    #[test]
    fn test_content_is_escaped() {
        let corpus = sample_corpus();
        let mut storage = SqliteStorage::open_memory().unwrap();
        Seeder::new(&mut storage, corpus.root(), SeedLayout::default())
            .init(false)
            .unwrap();

        let xss = storage.get_kb_item("14").unwrap().unwrap();
        assert_eq!(xss.title, "Cross site scripting");
        assert_eq!(xss.content, "Don''t trust ''input''");

        let flask = &storage.list_code_items(Some("flask")).unwrap()[0];
        assert_eq!(flask.title, "CSRF protection");
        assert_eq!(flask.content, " CSRF\n use tokens");

        let go = &storage.list_code_items(Some("go-needs-reviewing")).unwrap()[0];
        assert_eq!(go.content, "db.Query(''x'')");
    }

    #[test]
    fn test_category_links() {
        let corpus = sample_corpus();
        let mut storage = SqliteStorage::open_memory().unwrap();
        Seeder::new(&mut storage, corpus.root(), SeedLayout::default())
            .init(false)
            .unwrap();

        let categories = storage.list_categories().unwrap();
        assert_eq!(categories[0].id, WEB_CATEGORY_ID);
        assert_eq!(categories[0].name, "Web applications");

        assert_eq!(storage.get_kb_item("1").unwrap().unwrap().checklist_category_id, None);
        assert_eq!(
            storage.get_kb_item("14").unwrap().unwrap().checklist_category_id,
            Some(WEB_CATEGORY_ID)
        );
        assert!(storage
            .list_code_items(None)
            .unwrap()
            .iter()
            .all(|i| i.checklist_category_id == WEB_CATEGORY_ID));
    }

    #[test]
    fn test_mobile_kb_links_second_category() {
        let corpus = sample_corpus();
        corpus.kb("mobile", "30-masvs-kb-Root_detection-mobile.md", "root");
        let layout = SeedLayout {
            knowledge_base_types: vec!["web".into(), "mobile".into()],
            ..SeedLayout::default()
        };

        let mut storage = SqliteStorage::open_memory().unwrap();
        Seeder::new(&mut storage, corpus.root(), layout).init(false).unwrap();

        let item = storage.get_kb_item("30").unwrap().unwrap();
        assert_eq!(item.checklist_category_id, Some(2));
    }

    #[test]
    fn test_testing_examples_load_in_filename_order() {
        let corpus = sample_corpus();
        corpus.code("testing", "0-test-web-Zeroth_test-x.md", "zero");
        let mut storage = SqliteStorage::open_memory().unwrap();
        Seeder::new(&mut storage, corpus.root(), SeedLayout::default())
            .init(false)
            .unwrap();

        assert_eq!(
            titles(&storage, "testing"),
            ["Zeroth test", "First test", "Second test"]
        );
    }

    #[test]
    fn test_init_twice_reports_already_initialized() {
        let corpus = sample_corpus();
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut seeder = Seeder::new(&mut storage, corpus.root(), SeedLayout::default());

        assert!(matches!(seeder.init(false).unwrap(), InitOutcome::Initialized(_)));
        assert_eq!(seeder.init(false).unwrap(), InitOutcome::AlreadyInitialized);
        drop(seeder);

        assert_eq!(storage.counts().unwrap().checklist_categories, 3);
    }

    #[test]
    fn test_init_propagates_real_failures() {
        let corpus = Corpus::new();
        let mut storage = SqliteStorage::open_memory().unwrap();

        let err = Seeder::new(&mut storage, corpus.root(), SeedLayout::default())
            .init(false)
            .unwrap_err();
        assert!(matches!(err, Error::ResourceDir { .. }), "got {err}");
    }

    #[test]
    fn test_clear_then_init_matches_files_on_disk() {
        let corpus = sample_corpus();
        let mut storage = SqliteStorage::open_memory().unwrap();
        Seeder::new(&mut storage, corpus.root(), SeedLayout::default())
            .init(false)
            .unwrap();

        corpus.remove_kb("web", "14-asvs-kb-Cross_site_scripting-web.md");
        corpus.kb("web", "22-asvs-kb-Open_redirect-web.md", "redirect");

        let mut seeder = Seeder::new(&mut storage, corpus.root(), SeedLayout::default());
        seeder.clear().unwrap();
        seeder.init(false).unwrap();
        drop(seeder);

        let kb_ids: Vec<String> = storage
            .list_kb_items()
            .unwrap()
            .into_iter()
            .map(|i| i.kb_id)
            .collect();
        assert_eq!(kb_ids.len(), 2);
        assert!(kb_ids.contains(&"1".to_string()));
        assert!(kb_ids.contains(&"22".to_string()));
        assert_eq!(storage.counts().unwrap().code_items, 4);
    }

    #[test]
    fn test_clear_drops_schema() {
        let corpus = sample_corpus();
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut seeder = Seeder::new(&mut storage, corpus.root(), SeedLayout::default());
        seeder.init(false).unwrap();

        assert!(seeder.clear().unwrap() > 3);
        drop(seeder);
        assert!(!storage.is_seeded().unwrap());
        assert!(storage.list_kb_items().is_err());
    }

    #[test]
    fn test_clean_reseeds_populated_database() {
        let corpus = sample_corpus();
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut seeder = Seeder::new(&mut storage, corpus.root(), SeedLayout::default());
        seeder.init(false).unwrap();

        let report = seeder.clean(true).unwrap();
        assert!(report.testing);
        assert_eq!(report.inserted(), 9);
        drop(seeder);

        // categories restart at 1 after the drop
        assert_eq!(storage.list_categories().unwrap()[0].id, WEB_CATEGORY_ID);
        assert_eq!(storage.counts().unwrap().code_items, 4);
    }

    #[test]
    fn test_update_does_not_restore_testing_examples() {
        let corpus = sample_corpus();
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut seeder = Seeder::new(&mut storage, corpus.root(), SeedLayout::default());
        seeder.init(false).unwrap();

        let report = seeder.update().unwrap();
        assert_eq!(report.deleted.kb_items, 2);
        assert_eq!(report.deleted.code_items, 4);
        assert_eq!(report.loads.len(), 2);
        drop(seeder);

        assert!(titles(&storage, "testing").is_empty());
        assert_eq!(titles(&storage, "flask"), ["CSRF protection"]);
        assert_eq!(storage.counts().unwrap().kb_items, 2);
        assert_eq!(storage.counts().unwrap().checklist_categories, 3);
    }

    #[test]
    fn test_update_picks_up_new_files() {
        let corpus = sample_corpus();
        let mut storage = SqliteStorage::open_memory().unwrap();
        let mut seeder = Seeder::new(&mut storage, corpus.root(), SeedLayout::default());
        seeder.init(false).unwrap();

        corpus.kb("web", "40-asvs-kb-Clickjacking-web.md", "frames");
        seeder.update().unwrap();
        drop(seeder);

        assert!(storage.get_kb_item("40").unwrap().is_some());
    }

    #[test]
    fn test_duplicate_kb_id_aborts_load() {
        let corpus = sample_corpus();
        corpus.kb("web", "14-other-kb-Duplicate-web.md", "dup");
        let mut storage = SqliteStorage::open_memory().unwrap();

        let err = Seeder::new(&mut storage, corpus.root(), SeedLayout::default())
            .init(false)
            .unwrap_err();
        match err {
            Error::DuplicateKnowledgeBaseItem { kb_id, .. } => assert_eq!(kb_id, "14"),
            other => panic!("unexpected error: {other}"),
        }

        // code examples were committed before the knowledge base ran
        assert_eq!(storage.counts().unwrap().code_items, 4);
        assert!(storage.counts().unwrap().kb_items < 3);
    }

    #[test]
    fn test_duplicate_code_item_is_skipped() {
        let corpus = sample_corpus();
        corpus
            .code("flask", "9-code-flask-CSRF_protection-y.md", "again")
            .code("flask", "3-code-flask-XSS_filter-x.md", "escape");
        let mut storage = SqliteStorage::open_memory().unwrap();

        let outcome = Seeder::new(&mut storage, corpus.root(), SeedLayout::default())
            .init(false)
            .unwrap();
        let InitOutcome::Initialized(report) = outcome else {
            panic!("expected Initialized");
        };

        let code = report.load(Loader::CodeExamples).unwrap();
        assert_eq!(code.inserted, 3);
        assert_eq!(code.skipped.len(), 1);
        assert_eq!(code.skipped[0].reason, "duplicate");

        let mut flask = titles(&storage, "flask");
        flask.sort();
        assert_eq!(flask, ["CSRF protection", "XSS filter"]);
    }

    #[test]
    fn test_malformed_filename_fails() {
        let corpus = sample_corpus();
        corpus.code("flask", "broken-name.md", "x");
        let mut storage = SqliteStorage::open_memory().unwrap();

        let err = Seeder::new(&mut storage, corpus.root(), SeedLayout::default())
            .init(false)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedFilename { segments: 2, .. }));
    }

    #[test]
    fn test_initial_data_runs_last() {
        let corpus = sample_corpus();
        fs::write(
            corpus.root().join("initial_data.sql"),
            "INSERT INTO checklist_types (name, checklist_category_id) VALUES ('ASVS level 1', 1);
             INSERT INTO checklist_kb (checklist_id, content, checklist_type, kb_id)
             SELECT '1.1', 'Verify output encoding', 1, id FROM kb_items WHERE kb_id = '14';",
        )
        .unwrap();
        let mut storage = SqliteStorage::open_memory().unwrap();

        let outcome = Seeder::new(&mut storage, corpus.root(), SeedLayout::default())
            .init(false)
            .unwrap();
        let InitOutcome::Initialized(report) = outcome else {
            panic!("expected Initialized");
        };
        assert!(matches!(report.initial_data, InitialData::Applied { .. }));

        let linked: i64 = storage
            .conn()
            .query_row("SELECT COUNT(*) FROM checklist_kb WHERE kb_id IS NOT NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(linked, 1);
    }

    #[test]
    fn test_custom_initial_data_loader() {
        struct Failing;
        impl InitialDataLoader for Failing {
            fn load(&self, _: &mut SqliteStorage, _: &Path) -> Result<InitialData> {
                Err(Error::Other("fixture exploded".into()))
            }
        }

        let corpus = sample_corpus();
        let mut storage = SqliteStorage::open_memory().unwrap();
        let err = Seeder::new(&mut storage, corpus.root(), SeedLayout::default())
            .with_initial_data(Failing)
            .clean(false)
            .unwrap_err();
        assert!(matches!(err, Error::Other(_)));

        let mut storage = SqliteStorage::open_memory().unwrap();
        let outcome = Seeder::new(&mut storage, corpus.root(), SeedLayout::default())
            .with_initial_data(NoInitialData)
            .init(false)
            .unwrap();
        assert!(matches!(outcome, InitOutcome::Initialized(_)));
    }
}
