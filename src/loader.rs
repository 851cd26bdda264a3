//! Per-unit parsing contract shared by every content source.
//!
//! A [`Loader`] turns one content source (a directory of Markdown files or a
//! single JSON document) into a sorted list of entities. Loading is
//! best-effort: every unit is parsed independently into a
//! `Result<Entity, ParseError>`, failed units are logged with their path and
//! dropped, and the rest of the source still loads.
//!
//! ```text
//! posts/
//! ├── 2024-01-30-hello.md    → Ok(BlogPost)
//! ├── broken.md              → Err(ParseError::Frontmatter)  → ParseFailure, logged
//! └── notes.txt              (ignored: wrong extension)
//! ```

use crate::freshness::{FreshnessGate, matching_files};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frontmatter error: {0}")]
    Frontmatter(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid date: {0:?}")]
    InvalidDate(String),
}

/// A unit that could not be parsed, kept for diagnostics.
#[derive(Debug)]
pub struct ParseFailure {
    pub path: PathBuf,
    pub error: ParseError,
}

/// Everything one scan of a source produced.
#[derive(Debug)]
pub struct Loaded<T> {
    /// Parsed entities, already in collection order.
    pub items: Vec<T>,
    pub failures: Vec<ParseFailure>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// A content kind: where it lives and how to parse it.
pub trait Loader {
    type Item;

    /// The freshness gate watching this loader's source.
    fn gate(&self) -> &FreshnessGate;

    /// Fully rescan the source. Never fails as a whole.
    fn load(&self) -> Loaded<Self::Item>;
}

/// Parse every matching file directly inside `dir`, in filename order.
///
/// A missing directory is logged and yields an empty collection.
pub fn load_directory<T>(
    dir: &Path,
    extension: &str,
    mut parse: impl FnMut(&Path) -> Result<T, ParseError>,
) -> Loaded<T> {
    let mut loaded = Loaded::default();
    if !dir.is_dir() {
        warn!(path = %dir.display(), "content directory missing, collection is empty");
        return loaded;
    }
    for path in matching_files(dir, extension) {
        match parse(&path) {
            Ok(item) => loaded.items.push(item),
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping unparseable content");
                loaded.failures.push(ParseFailure { path, error });
            }
        }
    }
    loaded
}
