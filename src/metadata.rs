//! Field resolution for content entities.
//!
//! Several entity fields can come from more than one place. Each is resolved
//! independently and the first usable source wins:
//!
//! - **Slug**: frontmatter `slug` → filename with date prefix stripped → bare stem
//! - **Date**: frontmatter `date` → filename date prefix → file mtime (posts only)
//! - **Excerpt**: frontmatter `excerpt` → `description` → computed from the HTML
//! - **Image**: frontmatter `featured_image` → `image`
//!
//! An explicit frontmatter date must be a real `YYYY-MM-DD` date (a trailing
//! time-of-day is ignored). Posts treat a malformed date as a parse failure;
//! projects treat it as "no date".

use chrono::{DateTime, Local, NaiveDate};
use std::path::Path;
use std::time::SystemTime;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Resolve a field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value.
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Parse an explicit date field.
///
/// Accepts `YYYY-MM-DD`, optionally followed by a `T` or space and a time of
/// day, which is discarded.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date);
    }
    let (head, rest) = raw.split_at_checked(10)?;
    if rest.starts_with('T') || rest.starts_with(' ') {
        NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
    } else {
        None
    }
}

/// Local calendar date of a file's last modification.
pub fn modified_date(path: &Path) -> std::io::Result<NaiveDate> {
    let modified: SystemTime = std::fs::metadata(path)?.modified()?;
    Ok(DateTime::<Local>::from(modified).date_naive())
}

/// Long display form: `January 30, 2024`.
pub fn format_long(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// ISO form: `2024-01-30`.
pub fn format_iso(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
