//! Personal context: the one strictly validated JSON document.
//!
//! Unlike posts and projects, the context document is all-or-nothing. It is
//! loaded once at startup and any schema violation is fatal:
//!
//! ```text
//! personal_info.json ──► serde_json::Value ──► validate ──► decode ──► derive ──► Context
//!                                                 │
//!                                                 └─ errors? ──► ContextError::Invalid(report)
//! ```
//!
//! After startup, [`ContextStore::reload_if_changed`] re-reads the file when
//! its mtime differs from the one recorded at the last successful load. The
//! check is explicit; nothing reloads behind the caller's back. A failed
//! reload returns the error and leaves the previous context in place.

pub mod derive;
pub mod validate;

use crate::metadata::parse_date;
use arc_swap::ArcSwap;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("context document is invalid:\n{0}")]
    Invalid(ValidationReport),
}

/// Every problem found in one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {error}")?;
        }
        Ok(())
    }
}

/// Display granularity of a timeline date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Year,
    Month,
    Day,
}

/// A timeline item as written in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineItem {
    /// Anything other than a string reads as unset.
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    pub start_date: String,
    pub start_precision: Precision,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Only meaningful alongside `end_date`; anything unrecognised reads as unset.
    #[serde(default, deserialize_with = "lenient_precision")]
    pub end_precision: Option<Precision>,
    pub is_current: bool,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default)]
    pub thesis: Option<Thesis>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thesis {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A timeline item with its parsed dates and display fields.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    #[serde(flatten)]
    pub item: TimelineItem,
    #[serde(skip)]
    pub start: NaiveDate,
    #[serde(skip)]
    pub end: Option<NaiveDate>,
    pub display_range: String,
    pub display_title: String,
    pub display_subtitle: String,
    pub dot_class: String,
}

impl TimelineEntry {
    pub fn new(item: TimelineItem, start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self {
            item,
            start,
            end,
            display_range: String::new(),
            display_title: String::new(),
            display_subtitle: String::new(),
            dot_class: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AboutMe {
    pub professional_bio: Vec<String>,
    pub timeline: Vec<TimelineEntry>,
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub socials: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hobby {
    #[serde(default, deserialize_with = "lenient_string")]
    pub background: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Optional shortcut maps for templates: name → path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assets {
    #[serde(default, deserialize_with = "lenient_map")]
    pub images: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub files: BTreeMap<String, String>,
}

/// The validated, derived context.
#[derive(Debug, Clone, Serialize)]
pub struct Context {
    pub personal_info: PersonalInfo,
    pub about_me: AboutMe,
    pub contact: Contact,
    pub hobbies: BTreeMap<String, Hobby>,
    pub assets: Assets,
    /// Non-fatal findings from validation.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

#[derive(Deserialize)]
struct RawAbout {
    professional_bio: Vec<String>,
    timeline: Vec<TimelineItem>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct RawContext {
    personal_info: PersonalInfo,
    about_me: RawAbout,
    contact: Contact,
    #[serde(default, deserialize_with = "lenient_map")]
    hobbies: BTreeMap<String, Hobby>,
    #[serde(default, deserialize_with = "lenient_object")]
    assets: Assets,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A string, or `None` for anything else.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// The entries of an object that decode as `T`; anything else is empty.
fn lenient_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(Value::Object(entries)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| serde_json::from_value(value).ok().map(|v| (key, v)))
        .collect())
}

/// An object decoded as `T`, or `T::default()` for any other shape.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
        _ => T::default(),
    })
}

fn lenient_precision<'de, D>(deserializer: D) -> Result<Option<Precision>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

/// Validate, decode and derive a context document.
pub fn build(doc: Value) -> Result<Context, ContextError> {
    let report = validate::validate(&doc);
    if !report.is_ok() {
        return Err(ContextError::Invalid(report));
    }
    let raw: RawContext = serde_json::from_value(doc)?;

    let entries = raw
        .about_me
        .timeline
        .into_iter()
        .filter_map(|item| {
            // Dates were validated above.
            let start = parse_date(&item.start_date)?;
            let end = item.end_date.as_deref().and_then(parse_date);
            Some(TimelineEntry::new(item, start, end))
        })
        .collect();

    let hobbies = raw
        .hobbies
        .into_iter()
        .map(|(id, mut hobby)| {
            hobby.background = hobby.background.map(|bg| derive::normalize_asset_path(&bg));
            (id, hobby)
        })
        .collect();

    Ok(Context {
        personal_info: raw.personal_info,
        about_me: AboutMe {
            professional_bio: raw.about_me.professional_bio,
            timeline: derive::arrange(entries),
            extra: raw.about_me.extra,
        },
        contact: raw.contact,
        hobbies,
        assets: raw.assets,
        warnings: report.warnings,
    })
}

/// Read and build the context document at `path`.
pub fn read_context(path: &Path) -> Result<Context, ContextError> {
    let text = fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&text)?;
    let context = build(doc)?;
    for warning in &context.warnings {
        warn!(path = %path.display(), "{warning}");
    }
    Ok(context)
}

struct Current {
    context: Arc<Context>,
    mtime: SystemTime,
}

/// Holds the live context and reloads it on request.
pub struct ContextStore {
    path: PathBuf,
    current: ArcSwap<Current>,
}

impl ContextStore {
    /// Load the document. Startup must treat an error here as fatal.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ContextError> {
        let path = path.into();
        let mtime = fs::metadata(&path)?.modified()?;
        let context = read_context(&path)?;
        Ok(Self {
            path,
            current: ArcSwap::from_pointee(Current {
                context: Arc::new(context),
                mtime,
            }),
        })
    }

    pub fn context(&self) -> Arc<Context> {
        Arc::clone(&self.current.load().context)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the document if its mtime changed. Returns whether it reloaded.
    pub fn reload_if_changed(&self) -> Result<bool, ContextError> {
        let mtime = fs::metadata(&self.path)?.modified()?;
        if mtime == self.current.load().mtime {
            return Ok(false);
        }
        let context = read_context(&self.path)?;
        self.current.store(Arc::new(Current {
            context: Arc::new(context),
            mtime,
        }));
        info!(path = %self.path.display(), "context reloaded");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{sample_context, set_mtime, write_file};
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    // =========================================================================
    // build()
    // =========================================================================

    #[test]
    fn builds_typed_context_with_derived_timeline() {
        let ctx = build(sample_context()).unwrap();
        assert_eq!(ctx.personal_info.name, "Ada Lovelace");
        assert_eq!(ctx.about_me.professional_bio.len(), 2);

        let titles: Vec<&str> = ctx
            .about_me
            .timeline
            .iter()
            .map(|e| e.display_title.as_str())
            .collect();
        assert_eq!(titles, vec!["Staff Engineer", "Analytical Engine", "BSc Mathematics"]);

        let first = &ctx.about_me.timeline[0];
        assert_eq!(first.display_range, "Mar 2021 – Present");
        assert_eq!(first.display_subtitle, "Acme • Platform team");
        assert_eq!(first.dot_class, "bg-zinc-100");
        assert_eq!(ctx.about_me.timeline[2].dot_class, "bg-zinc-500");
    }

    #[test]
    fn hobby_backgrounds_normalized() {
        let ctx = build(sample_context()).unwrap();
        assert_eq!(
            ctx.hobbies["f1"].background.as_deref(),
            Some("images/f1_bg.jpg")
        );
        assert_eq!(
            ctx.hobbies["cooking"].background.as_deref(),
            Some("images/cooking_bg.webp")
        );
    }

    #[test]
    fn assets_and_socials_exposed() {
        let ctx = build(sample_context()).unwrap();
        assert_eq!(ctx.assets.images["profile"], "images/profile.jpeg");
        assert_eq!(ctx.assets.files["resume"], "resume.pdf");
        assert_eq!(ctx.contact.socials["github"], "https://github.com/ada");
    }

    #[test]
    fn missing_optional_sections_default() {
        let mut doc = sample_context();
        let root = doc.as_object_mut().unwrap();
        root.remove("hobbies");
        root.remove("assets");
        root["contact"]["socials"] = Value::Null;
        let ctx = build(doc).unwrap();
        assert!(ctx.hobbies.is_empty());
        assert!(ctx.assets.images.is_empty());
        assert!(ctx.contact.socials.is_empty());
    }

    #[test]
    fn invalid_document_reports_all_errors() {
        let mut doc = sample_context();
        doc["personal_info"]["email"] = json!("nope");
        doc["about_me"]["timeline"][0]["end_date"] = json!("2024-01-01");
        let Err(ContextError::Invalid(report)) = build(doc) else {
            panic!("expected validation failure");
        };
        assert_eq!(report.errors.len(), 2);
        let shown = ContextError::Invalid(report).to_string();
        assert!(shown.contains("personal_info.email"));
        assert!(shown.contains("must be null when is_current=true"));
    }

    #[test]
    fn warnings_kept_on_success() {
        let mut doc = sample_context();
        doc["about_me"]["timeline"][0]["type"] = json!("side-gig");
        let ctx = build(doc).unwrap();
        assert_eq!(ctx.warnings.len(), 1);
    }

    #[test]
    fn non_string_type_warns_and_falls_back() {
        let mut doc = sample_context();
        doc["about_me"]["timeline"][0]["type"] = json!(5);
        let ctx = build(doc).unwrap();
        assert_eq!(
            ctx.warnings,
            vec![r#"about_me.timeline[0].type: expected ["education", "project", "work"] (got 5)"#]
        );
        let entry = ctx
            .about_me
            .timeline
            .iter()
            .find(|e| e.item.organization.as_deref() == Some("Acme"))
            .unwrap();
        assert_eq!(entry.item.kind, None);
        // No type: the title falls back through title, role, degree.
        assert_eq!(entry.display_title, "Staff Engineer");
    }

    #[test]
    fn non_string_title_fields_read_as_unset() {
        let mut doc = sample_context();
        doc["about_me"]["timeline"][0]["role"] = json!(7);
        doc["about_me"]["timeline"][0]["description"] = json!({"long": true});
        let ctx = build(doc).unwrap();
        let entry = &ctx.about_me.timeline[0];
        assert_eq!(entry.item.role, None);
        assert_eq!(entry.display_title, "");
        assert_eq!(entry.display_subtitle, "Acme");
        assert_eq!(ctx.warnings.len(), 2);
    }

    #[test]
    fn misshapen_hobbies_and_assets_load_empty() {
        let mut doc = sample_context();
        doc["hobbies"] = json!([]);
        doc["assets"] = json!("images/");
        let ctx = build(doc).unwrap();
        assert!(ctx.hobbies.is_empty());
        assert!(ctx.assets.files.is_empty());
        assert_eq!(ctx.warnings.len(), 2);
    }

    #[test]
    fn bad_hobby_and_asset_entries_dropped() {
        let mut doc = sample_context();
        doc["hobbies"]["chess"] = json!("yes");
        doc["hobbies"]["f1"]["background"] = json!(1);
        doc["assets"]["files"]["cv"] = json!(3);
        let ctx = build(doc).unwrap();
        assert!(!ctx.hobbies.contains_key("chess"));
        assert_eq!(ctx.hobbies["f1"].background, None);
        assert_eq!(ctx.assets.files.len(), 1);
        assert_eq!(ctx.assets.files["resume"], "resume.pdf");
    }

    #[test]
    fn timeline_extra_fields_serialized_flat() {
        let ctx = build(sample_context()).unwrap();
        let value = serde_json::to_value(&ctx.about_me.timeline[0]).unwrap();
        assert_eq!(value["type"], "work");
        assert_eq!(value["display_range"], "Mar 2021 – Present");
        assert_eq!(value["highlights"], json!(["Scaled the build farm"]));
    }

    // =========================================================================
    // ContextStore
    // =========================================================================

    #[test]
    fn load_missing_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let result = ContextStore::load(tmp.path().join("personal_info.json"));
        assert!(matches!(result, Err(ContextError::Io(_))));
    }

    #[test]
    fn load_malformed_json_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "ctx.json", "{ broken");
        assert!(matches!(
            ContextStore::load(path),
            Err(ContextError::Json(_))
        ));
    }

    #[test]
    fn reload_only_when_mtime_changes() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "ctx.json", &sample_context().to_string());
        let store = ContextStore::load(&path).unwrap();
        assert!(!store.reload_if_changed().unwrap());

        let mut doc = sample_context();
        doc["personal_info"]["name"] = json!("Ada King");
        fs::write(&path, doc.to_string()).unwrap();
        set_mtime(&path, SystemTime::now() + Duration::from_secs(120));

        assert!(store.reload_if_changed().unwrap());
        assert_eq!(store.context().personal_info.name, "Ada King");
        assert!(!store.reload_if_changed().unwrap());
    }

    #[test]
    fn failed_reload_keeps_previous_context() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "ctx.json", &sample_context().to_string());
        let store = ContextStore::load(&path).unwrap();

        fs::write(&path, r#"{"personal_info": {}}"#).unwrap();
        set_mtime(&path, SystemTime::now() + Duration::from_secs(120));

        assert!(matches!(
            store.reload_if_changed(),
            Err(ContextError::Invalid(_))
        ));
        assert_eq!(store.context().personal_info.name, "Ada Lovelace");
    }
}
