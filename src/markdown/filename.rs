//! Markdown filename convention.
//!
//! Files are named `<id>-<unused>-<unused>-<title>[-<unused>...].md`, with
//! words inside the id and title segments joined by underscores:
//!
//! ```text
//! 14-asvs-kb-Cross_site_scripting-web.md
//! ^^            ^^^^^^^^^^^^^^^^^^
//! id            title
//! ```

use crate::error::{Error, Result};
use std::path::Path;

/// Minimum number of `-` separated segments in a valid filename.
pub const MIN_SEGMENTS: usize = 4;

/// Identifier and title carried by a markdown filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownName {
    /// Segment 0, underscores replaced by spaces.
    pub external_id: String,
    /// Segment 3, underscores replaced by spaces.
    pub title: String,
}

/// Parse the identifier and title out of a markdown file path.
///
/// Segments are taken from the full filename, extension included, so a
/// name with exactly four segments keeps `.md` on its title.
///
/// # Errors
///
/// Returns [`Error::MalformedFilename`] if the filename is not valid UTF-8
/// (reported as zero segments) or has fewer than four segments.
pub fn parse_filename(path: &Path) -> Result<MarkdownName> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::MalformedFilename {
            path: path.to_path_buf(),
            segments: 0,
        })?;

    let segments: Vec<&str> = filename.split('-').collect();
    if segments.len() < MIN_SEGMENTS {
        return Err(Error::MalformedFilename {
            path: path.to_path_buf(),
            segments: segments.len(),
        });
    }

    Ok(MarkdownName {
        external_id: segments[0].replace('_', " "),
        title: segments[3].replace('_', " "),
    })
}
