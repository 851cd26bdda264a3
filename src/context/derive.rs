//! Presentation fields derived from a validated context.
//!
//! Timeline items gain three display strings and a dot colour:
//!
//! | Field | Source |
//! |-------|--------|
//! | `display_range` | start/end dates at their precision, `"<start> – Present"` when ongoing |
//! | `display_title` | `role` (work), `degree` (education), `title` (project), else first of title/role/degree |
//! | `display_subtitle` | `"{organization} • {description}"`, or whichever one is set |
//! | `dot_class` | [`DOT_PALETTE`] by final position, newest lightest |
//!
//! Items are ordered current first, then by start date, newest first.

use super::{Precision, TimelineEntry, TimelineItem};
use chrono::NaiveDate;

/// Timeline dot colours, lightest first. Positions past the end reuse the last.
pub const DOT_PALETTE: [&str; 6] = [
    "bg-zinc-100",
    "bg-zinc-400",
    "bg-zinc-500",
    "bg-zinc-600",
    "bg-zinc-700",
    "bg-zinc-800",
];

const IMAGE_DIR: &str = "images/";
const STATIC_DIR: &str = "static/";

/// A date at display precision: `Jan 2020` for year and month precision,
/// `23 Apr 2012` for day precision.
pub fn display_date(date: NaiveDate, precision: Precision) -> String {
    match precision {
        Precision::Year | Precision::Month => date.format("%b %Y").to_string(),
        Precision::Day => date.format("%d %b %Y").to_string(),
    }
}

pub fn display_range(entry: &TimelineEntry) -> String {
    let start = display_date(entry.start, entry.item.start_precision);
    match entry.end {
        Some(end) if !entry.item.is_current => {
            let precision = entry.item.end_precision.unwrap_or(Precision::Day);
            format!("{start} – {}", display_date(end, precision))
        }
        _ => format!("{start} – Present"),
    }
}

pub fn display_title(item: &TimelineItem) -> String {
    let pick = |field: &Option<String>| field.as_deref().map(str::trim).unwrap_or("").to_string();
    match item.kind.as_deref() {
        Some("work") => pick(&item.role),
        Some("education") => pick(&item.degree),
        Some("project") => pick(&item.title),
        _ => [&item.title, &item.role, &item.degree]
            .into_iter()
            .map(pick)
            .find(|s| !s.is_empty())
            .unwrap_or_default(),
    }
}

pub fn display_subtitle(item: &TimelineItem) -> String {
    let org = item.organization.as_deref().unwrap_or("").trim();
    let desc = item.description.as_deref().unwrap_or("").trim();
    match (org.is_empty(), desc.is_empty()) {
        (false, false) => format!("{org} • {desc}"),
        (false, true) => org.to_string(),
        _ => desc.to_string(),
    }
}

/// Fill display fields, sort, and assign palette colours.
pub fn arrange(mut entries: Vec<TimelineEntry>) -> Vec<TimelineEntry> {
    for entry in &mut entries {
        entry.display_range = display_range(entry);
        entry.display_title = display_title(&entry.item);
        entry.display_subtitle = display_subtitle(&entry.item);
    }
    // Stable: identical keys keep document order.
    entries.sort_by(|a, b| (b.item.is_current, b.start).cmp(&(a.item.is_current, a.start)));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.dot_class = DOT_PALETTE[i.min(DOT_PALETTE.len() - 1)].to_string();
    }
    entries
}

/// Normalize an asset path to live under `images/`.
///
/// Leading `/` and redundant `static/` segments are dropped, and `images/` is
/// prefixed once. Applying it twice gives the same result.
pub fn normalize_asset_path(path: &str) -> String {
    let mut rest = path.trim().trim_start_matches('/');
    while let Some(stripped) = rest.strip_prefix(STATIC_DIR) {
        rest = stripped.trim_start_matches('/');
    }
    if rest.starts_with(IMAGE_DIR) {
        rest.to_string()
    } else {
        format!("{IMAGE_DIR}{rest}")
    }
}
