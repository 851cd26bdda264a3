//! Strict schema validation for the personal context document.
//!
//! Validation runs on the raw JSON tree before anything is decoded, so every
//! problem in the document is collected in one pass. Each message starts with
//! the path of the offending field:
//!
//! ```text
//! personal_info.email: must be valid email
//! about_me.timeline[2].start_date: precision='year' requires MM-DD = 01-01 (got: 2020-03-01)
//! contact.socials.github: must be http(s) url
//! ```
//!
//! Errors reject the document. Warnings are reported but do not: an unknown
//! timeline type, a missing type-specific title, or a display-only field
//! (hobbies, assets, timeline titles and descriptions) with the wrong shape,
//! which the decoder then treats as unset.

use super::ValidationReport;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

const PRECISIONS: [&str; 3] = ["day", "month", "year"];
const TIMELINE_TYPES: [&str; 3] = ["education", "project", "work"];

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// Validate a whole context document.
pub fn validate(doc: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    let Some(root) = doc.as_object() else {
        report
            .errors
            .push(format!("root: must be an object (got: {})", kind(doc)));
        return report;
    };

    for key in ["personal_info", "about_me", "contact"] {
        if !root.contains_key(key) {
            report.errors.push(format!("root: missing key '{key}'"));
        }
    }

    if let Some(personal) = section(root, "personal_info", &mut report) {
        validate_personal(personal, &mut report);
    }
    if let Some(about) = section(root, "about_me", &mut report) {
        validate_about(about, &mut report);
    }
    if let Some(contact) = section(root, "contact", &mut report) {
        validate_contact(contact, &mut report);
    }
    validate_hobbies(root.get("hobbies"), &mut report);
    validate_assets(root.get("assets"), &mut report);
    report
}

/// A required top-level object. Absence is reported by the root key check.
fn section<'a>(
    root: &'a Map<String, Value>,
    key: &str,
    report: &mut ValidationReport,
) -> Option<&'a Map<String, Value>> {
    let value = root.get(key)?;
    let object = value.as_object();
    if object.is_none() {
        report.errors.push(format!("{key}: must be object"));
    }
    object
}

fn validate_personal(personal: &Map<String, Value>, report: &mut ValidationReport) {
    if !is_non_empty_str(personal.get("name")) {
        report
            .errors
            .push("personal_info.name: must be non-empty string".into());
    }
    if !is_email(personal.get("email")) {
        report
            .errors
            .push("personal_info.email: must be valid email".into());
    }
    optional_string(personal, "title", "personal_info.title", report);
}

fn validate_about(about: &Map<String, Value>, report: &mut ValidationReport) {
    let bio_ok = about
        .get("professional_bio")
        .and_then(Value::as_array)
        .is_some_and(|lines| lines.iter().all(Value::is_string));
    if !bio_ok {
        report
            .errors
            .push("about_me.professional_bio: must be list[str]".into());
    }

    match about.get("timeline").and_then(Value::as_array) {
        Some(items) => {
            for (i, item) in items.iter().enumerate() {
                let path = format!("about_me.timeline[{i}]");
                match item.as_object() {
                    Some(item) => validate_timeline_item(item, &path, report),
                    None => report.errors.push(format!("{path}: must be object")),
                }
            }
        }
        None => report
            .errors
            .push("about_me.timeline: must be list".into()),
    }
}

fn validate_timeline_item(item: &Map<String, Value>, path: &str, report: &mut ValidationReport) {
    let kind = item.get("type").and_then(Value::as_str);
    if !kind.is_some_and(|k| TIMELINE_TYPES.contains(&k)) {
        report.warnings.push(format!(
            "{path}.type: expected {TIMELINE_TYPES:?} (got {})",
            shown(item.get("type"))
        ));
    }

    let start_precision = precision(item.get("start_precision"));
    if start_precision.is_none() {
        report.errors.push(format!(
            "{path}.start_precision: must be one of {PRECISIONS:?}"
        ));
    }
    let start = parse_iso_date(item.get("start_date"), &format!("{path}.start_date"), report);
    if let (Some(date), Some(p)) = (start, start_precision) {
        check_precision(date, p, &format!("{path}.start_date"), report);
    }

    let is_current = item.get("is_current");
    if !is_current.is_some_and(Value::is_boolean) {
        report
            .errors
            .push(format!("{path}.is_current: must be boolean"));
    }

    let end_raw = item.get("end_date").filter(|v| !v.is_null());
    if is_current.and_then(Value::as_bool) == Some(true) {
        if end_raw.is_some() {
            report.errors.push(format!(
                "{path}.end_date: must be null when is_current=true"
            ));
        }
    } else if let Some(end_raw) = end_raw {
        let end_precision = precision(item.get("end_precision"));
        if end_precision.is_none() {
            report.errors.push(format!(
                "{path}.end_precision: must be one of {PRECISIONS:?} when end_date set"
            ));
        }
        let end = parse_iso_date(Some(end_raw), &format!("{path}.end_date"), report);
        if matches!((end, start), (Some(end), Some(start)) if end < start) {
            report
                .errors
                .push(format!("{path}: end_date must be >= start_date"));
        }
        if let (Some(date), Some(p)) = (end, end_precision) {
            check_precision(date, p, &format!("{path}.end_date"), report);
        }
    }

    optional_string(item, "organization", &format!("{path}.organization"), report);
    for field in ["role", "degree", "title", "description"] {
        loose_string(item, field, &format!("{path}.{field}"), report);
    }

    let expected_title = match kind {
        Some("work") => Some("role"),
        Some("education") => Some("degree"),
        Some("project") => Some("title"),
        _ => None,
    };
    if let Some(field) = expected_title.filter(|f| !item.contains_key(*f)) {
        report.warnings.push(format!(
            "{path}.{field}: missing (expected for {})",
            kind.unwrap_or_default()
        ));
    }

    if let Some(thesis) = item.get("thesis").filter(|v| !v.is_null()) {
        match thesis.as_object() {
            Some(thesis) => {
                let link = thesis.get("link").filter(|v| !v.is_null());
                if link.is_some_and(|l| !l.as_str().is_some_and(looks_like_url)) {
                    report
                        .errors
                        .push(format!("{path}.thesis.link: must be http(s) url"));
                }
            }
            None => report.errors.push(format!("{path}.thesis: must be object")),
        }
    }
}

fn validate_contact(contact: &Map<String, Value>, report: &mut ValidationReport) {
    if !is_email(contact.get("email")) {
        report
            .errors
            .push("contact.email: must be valid email".into());
    }
    optional_string(contact, "location", "contact.location", report);

    match contact.get("socials") {
        None | Some(Value::Null) => {}
        Some(Value::Object(socials)) => {
            for (name, url) in socials {
                if !url.as_str().is_some_and(looks_like_url) {
                    report
                        .errors
                        .push(format!("contact.socials.{name}: must be http(s) url"));
                }
            }
        }
        Some(_) => report
            .errors
            .push("contact.socials: must be object".into()),
    }
}

/// Hobbies are decorative: a wrong shape is skipped with a warning.
fn validate_hobbies(hobbies: Option<&Value>, report: &mut ValidationReport) {
    match hobbies {
        None | Some(Value::Null) => {}
        Some(Value::Object(hobbies)) => {
            for (id, hobby) in hobbies {
                match hobby.as_object() {
                    Some(hobby) => loose_string(
                        hobby,
                        "background",
                        &format!("hobbies.{id}.background"),
                        report,
                    ),
                    None => report
                        .warnings
                        .push(format!("hobbies.{id}: expected object, ignored")),
                }
            }
        }
        Some(other) => report.warnings.push(format!(
            "hobbies: expected object, ignored (got: {})",
            kind(other)
        )),
    }
}

/// Same tolerance as hobbies: unusable entries are dropped with a warning.
fn validate_assets(assets: Option<&Value>, report: &mut ValidationReport) {
    let assets = match assets {
        None | Some(Value::Null) => return,
        Some(Value::Object(assets)) => assets,
        Some(other) => {
            report.warnings.push(format!(
                "assets: expected object, ignored (got: {})",
                kind(other)
            ));
            return;
        }
    };
    for group in ["images", "files"] {
        match assets.get(group) {
            None | Some(Value::Null) => {}
            Some(Value::Object(entries)) => {
                for (name, path) in entries {
                    if !path.is_string() {
                        report
                            .warnings
                            .push(format!("assets.{group}.{name}: expected string, ignored"));
                    }
                }
            }
            Some(_) => report
                .warnings
                .push(format!("assets.{group}: expected object, ignored")),
        }
    }
}

// =============================================================================
// Field checks
// =============================================================================

fn is_non_empty_str(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

fn is_email(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| EMAIL.is_match(s.trim()))
}

/// An absolute `http`/`https` URL with a host.
pub fn looks_like_url(s: &str) -> bool {
    url::Url::parse(s.trim()).is_ok_and(|u| {
        matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty())
    })
}

/// Present values must be strings; absent or null is fine.
fn optional_string(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
    report: &mut ValidationReport,
) {
    if object.get(key).is_some_and(|v| !v.is_null() && !v.is_string()) {
        report.errors.push(format!("{path}: must be string"));
    }
}

/// Like [`optional_string`], but a wrong type is only a warning and the
/// field reads as unset.
fn loose_string(object: &Map<String, Value>, key: &str, path: &str, report: &mut ValidationReport) {
    if object.get(key).is_some_and(|v| !v.is_null() && !v.is_string()) {
        report
            .warnings
            .push(format!("{path}: expected string, ignored (got {})", shown(object.get(key))));
    }
}

fn precision(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|p| PRECISIONS.contains(p))
}

fn parse_iso_date(value: Option<&Value>, path: &str, report: &mut ValidationReport) -> Option<NaiveDate> {
    let Some(raw) = value.and_then(Value::as_str).filter(|s| ISO_DATE.is_match(s)) else {
        report.errors.push(format!(
            "{path}: must be 'YYYY-MM-DD' (got: {})",
            shown(value)
        ));
        return None;
    };
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            report
                .errors
                .push(format!("{path}: invalid calendar date (got: {raw:?})"));
            None
        }
    }
}

/// Year precision pins the date to Jan 1, month precision to the 1st.
fn check_precision(date: NaiveDate, precision: &str, path: &str, report: &mut ValidationReport) {
    match precision {
        "year" if (date.month(), date.day()) != (1, 1) => report.errors.push(format!(
            "{path}: precision='year' requires MM-DD = 01-01 (got: {date})"
        )),
        "month" if date.day() != 1 => report.errors.push(format!(
            "{path}: precision='month' requires DD = 01 (got: {date})"
        )),
        _ => {}
    }
}

fn shown(value: Option<&Value>) -> String {
    value.map_or_else(|| "null".to_string(), Value::to_string)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
