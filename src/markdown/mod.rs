//! Markdown corpus handling.
//!
//! The corpus is a plain directory tree; every article or example is one
//! `.md` file whose name carries its identifier and title.
//!
//! # Submodules
//!
//! - [`filename`] - Filename convention parsing
//! - [`escape`] - Content escaping before persistence

pub mod escape;
pub mod filename;

pub use escape::{escape_code_content, escape_kb_content};
pub use filename::{parse_filename, MarkdownName};

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// A markdown file found in a content directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownFile {
    pub path: PathBuf,
    pub name: MarkdownName,
}

impl MarkdownFile {
    /// Read the full file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    pub fn read_content(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.path)?)
    }
}

/// List the `.md` files of a content directory.
///
/// Entries come back in the order the filesystem yields them unless
/// `sorted` is set, in which case they are ordered by filename. Filenames
/// are parsed eagerly so a malformed name fails the listing before any row
/// is written for it.
///
/// # Errors
///
/// Returns [`Error::ResourceDir`] if the directory cannot be read and
/// [`Error::MalformedFilename`] if a markdown filename is not well formed,
/// including names that are not valid UTF-8.
pub fn list_markdown_files(dir: &Path, sorted: bool) -> Result<Vec<MarkdownFile>> {
    let entries = std::fs::read_dir(dir).map_err(|source| Error::ResourceDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::ResourceDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_markdown = path
            .file_name()
            .is_some_and(|n| n.as_encoded_bytes().ends_with(b".md"));
        if is_markdown && path.is_file() {
            paths.push(path);
        }
    }

    if sorted {
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }

    paths
        .into_iter()
        .map(|path| {
            let name = parse_filename(&path)?;
            Ok(MarkdownFile { path, name })
        })
        .collect()
}
