//! Modification-time freshness checks for content sources.
//!
//! A source's *stamp* is the newest modification time among the things that
//! make up the source:
//!
//! - **Directory sources**: the directory's own mtime (catches deletions and
//!   renames) and the mtime of every matching file directly inside it.
//!   Subdirectories are not scanned.
//! - **File sources**: the file's own mtime.
//!
//! A missing source has the stamp [`UNIX_EPOCH`]. A cached collection is stale
//! when no stamp has been recorded yet, or when the current stamp is newer than
//! the recorded one.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

/// The thing a freshness stamp is computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreshnessGate {
    /// A directory of files with the given extension (case-insensitive).
    Directory { dir: PathBuf, extension: String },
    /// A single file.
    File { path: PathBuf },
}

impl FreshnessGate {
    pub fn directory(dir: impl Into<PathBuf>, extension: &str) -> Self {
        FreshnessGate::Directory {
            dir: dir.into(),
            extension: extension.to_string(),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        FreshnessGate::File { path: path.into() }
    }

    /// Path of the directory or file this gate watches.
    pub fn path(&self) -> &Path {
        match self {
            FreshnessGate::Directory { dir, .. } => dir,
            FreshnessGate::File { path } => path,
        }
    }

    /// Whether the source currently exists.
    pub fn exists(&self) -> bool {
        match self {
            FreshnessGate::Directory { dir, .. } => dir.is_dir(),
            FreshnessGate::File { path } => path.is_file(),
        }
    }

    /// Newest modification time across the source.
    pub fn stamp(&self) -> SystemTime {
        match self {
            FreshnessGate::Directory { dir, extension } => {
                let Some(dir_mtime) = mtime(dir) else {
                    return UNIX_EPOCH;
                };
                matching_files(dir, extension)
                    .iter()
                    .filter_map(|p| mtime(p))
                    .fold(dir_mtime, SystemTime::max)
            }
            FreshnessGate::File { path } => mtime(path).unwrap_or(UNIX_EPOCH),
        }
    }

    /// Whether a collection recorded at `last` must be reloaded.
    pub fn is_stale(&self, last: Option<SystemTime>) -> bool {
        matches!(self.check(last), Freshness::Stale(_))
    }

    /// Compare the current stamp against `last`, handing back the stamp to
    /// record when a reload is due.
    pub fn check(&self, last: Option<SystemTime>) -> Freshness {
        let stamp = self.stamp();
        match last {
            Some(recorded) if stamp <= recorded => Freshness::Fresh,
            _ => Freshness::Stale(stamp),
        }
    }
}

/// Outcome of a freshness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    /// Reload, then record this stamp. It is taken before the reload so an
    /// edit made mid-scan is picked up by the next check.
    Stale(SystemTime),
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Files directly inside `dir` whose extension matches, sorted by path.
///
/// Hidden files are skipped. A missing or unreadable directory yields an
/// empty list.
pub fn matching_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(walkdir::DirEntry::into_path)
        .filter(|p| {
            p.extension()
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        })
        .collect();
    files.sort();
    files
}
