//! Centralized filename parsing for the `YYYY-MM-DD-name` convention.
//!
//! Posts and projects may carry a publication date in their filename:
//! `2024-01-30-hello-world.md`. The date prefix feeds date resolution and is
//! stripped from the slug, so the URL stays `/blog/hello-world`.
//!
//! - `2024-01-30-hello-world` → date=Some(2024-01-30), slug="hello-world"
//! - `hello-world` → date=None, slug="hello-world"
//! - `2024-01-30` → date=Some(2024-01-30), slug="2024-01-30" (nothing left to strip)
//! - `2024-13-40-typo` → date=None, slug="typo" (date-shaped but not a calendar date)

use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})(?:-(.+))?$").expect("date prefix pattern is valid")
});

/// Result of parsing a content filename stem like `2024-01-30-hello-world`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Calendar date from the prefix, if the prefix is a valid date.
    pub date: Option<NaiveDate>,
    /// Slug: the stem with any date-shaped prefix removed.
    pub slug: String,
}

/// Parse a filename stem following the `YYYY-MM-DD-name` convention.
pub fn parse_entry_name(stem: &str) -> ParsedName {
    match DATE_PREFIX.captures(stem) {
        Some(caps) => {
            let prefix = caps.get(1).map_or("", |m| m.as_str());
            let date = NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok();
            let slug = caps
                .get(2)
                .map_or_else(|| stem.to_string(), |m| m.as_str().to_string());
            ParsedName { date, slug }
        }
        None => ParsedName {
            date: None,
            slug: stem.to_string(),
        },
    }
}

/// Filename stem of a content path (`posts/2024-01-30-x.md` → `2024-01-30-x`).
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Turn heading text into an anchor id: lowercase, alphanumerics kept,
/// everything else collapsed into single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut prev_dash = true;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '_' {
            slug.push(c);
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
