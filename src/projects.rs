//! Portfolio projects: Markdown files with frontmatter in the projects directory.
//!
//! Projects use the same frontmatter conventions as posts plus a handful of
//! showcase fields (`type`, `github_url`, `demo_url`, `featured`,
//! `technologies`, `stars`, `forks`). Differences from posts:
//!
//! - the date is optional: no file mtime fallback, and a malformed date is
//!   treated as absent rather than as a parse failure;
//! - the excerpt field is `description`, computed with a longer budget;
//! - headings get no permalink anchors;
//! - an unknown `type` is kept as written, and a count that is not a whole
//!   number reads as 0.
//!
//! The collection is sorted by `(date, title)` descending, with undated
//! projects last.

use crate::config::ProjectsConfig;
use crate::engine::ContentEngine;
use crate::freshness::FreshnessGate;
use crate::frontmatter::{self, ListField, lenient_count, null_as_default, scalar_string};
use crate::loader::{Loaded, Loader, ParseError, load_directory};
use crate::markdown::{self, Anchors};
use crate::metadata;
use crate::naming::{file_stem, parse_entry_name};
use crate::query::Entry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const EXTENSION: &str = "md";
const UNTITLED: &str = "Untitled Project";

pub type ProjectEngine = ContentEngine<ProjectLoader>;

/// Where a project lives.
///
/// Serializes as its name; a type folio does not know is kept as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Github,
    #[default]
    Local,
    #[serde(untagged)]
    Other(String),
}

impl ProjectType {
    /// Case-insensitive; blank means [`ProjectType::Local`].
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("local") {
            ProjectType::Local
        } else if name.eq_ignore_ascii_case("github") {
            ProjectType::Github
        } else {
            ProjectType::Other(name.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub content_raw: String,
    pub content_html: String,
    pub tags: Vec<String>,
    pub date: Option<NaiveDate>,
    pub project_type: ProjectType,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub featured_image: Option<String>,
    pub featured: bool,
    pub technologies: Vec<String>,
    pub stars: u64,
    pub forks: u64,
    pub is_draft: bool,
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl Project {
    /// `January 30, 2024`, or empty when undated.
    pub fn date_formatted(&self) -> String {
        self.date.map(metadata::format_long).unwrap_or_default()
    }

    pub fn date_iso(&self) -> String {
        self.date.map(metadata::format_iso).unwrap_or_default()
    }
}

impl Entry for Project {
    fn slug(&self) -> &str {
        &self.slug
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
    fn is_draft(&self) -> bool {
        self.is_draft
    }
    fn body(&self) -> &str {
        &self.content_raw
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProjectFrontmatter {
    #[serde(deserialize_with = "scalar_string")]
    title: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    date: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    slug: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    tags: ListField,
    #[serde(deserialize_with = "null_as_default")]
    technologies: ListField,
    #[serde(deserialize_with = "null_as_default")]
    draft: bool,
    #[serde(rename = "type", deserialize_with = "scalar_string")]
    project_type: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    github_url: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    demo_url: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    featured_image: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    image: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    featured: bool,
    #[serde(deserialize_with = "lenient_count")]
    stars: u64,
    #[serde(deserialize_with = "lenient_count")]
    forks: u64,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

/// Parse one project file.
pub fn parse_project(path: &Path, excerpt_length: usize) -> Result<Project, ParseError> {
    let source = fs::read_to_string(path)?;
    let (fm, body): (ProjectFrontmatter, String) = frontmatter::parse(&source)?;
    let name = parse_entry_name(&file_stem(path));

    let date = match fm.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => metadata::parse_date(raw),
        None => name.date,
    };

    let content_html = markdown::render(&body, Anchors::None).html;
    let description = metadata::resolve(&[fm.description.as_deref()])
        .unwrap_or_else(|| markdown::excerpt(&content_html, excerpt_length));

    Ok(Project {
        slug: metadata::resolve(&[fm.slug.as_deref()]).unwrap_or(name.slug),
        title: metadata::resolve(&[fm.title.as_deref()]).unwrap_or_else(|| UNTITLED.into()),
        description,
        content_html,
        content_raw: body,
        tags: fm.tags.into_vec(),
        date,
        project_type: fm
            .project_type
            .as_deref()
            .map(ProjectType::from_name)
            .unwrap_or_default(),
        github_url: metadata::resolve(&[fm.github_url.as_deref()]),
        demo_url: metadata::resolve(&[fm.demo_url.as_deref()]),
        featured_image: metadata::resolve(&[fm.featured_image.as_deref(), fm.image.as_deref()]),
        featured: fm.featured,
        technologies: fm.technologies.into_vec(),
        stars: fm.stars,
        forks: fm.forks,
        is_draft: fm.draft,
        meta: fm.extra,
    })
}

/// Featured projects first, padded with the newest non-featured ones.
pub fn featured(items: &[Arc<Project>], limit: usize) -> Vec<Arc<Project>> {
    let (mut picked, rest): (Vec<_>, Vec<_>) = items.iter().cloned().partition(|p| p.featured);
    picked.extend(rest);
    picked.truncate(limit);
    picked
}

impl ProjectEngine {
    pub fn get_featured(&self, limit: usize) -> Vec<Arc<Project>> {
        featured(&self.get_all(false), limit)
    }
}

/// Loads the projects directory.
pub struct ProjectLoader {
    gate: FreshnessGate,
    excerpt_length: usize,
}

impl ProjectLoader {
    pub fn new(dir: impl Into<PathBuf>, config: &ProjectsConfig) -> Self {
        Self {
            gate: FreshnessGate::directory(dir, EXTENSION),
            excerpt_length: config.excerpt_length,
        }
    }
}

impl Loader for ProjectLoader {
    type Item = Project;

    fn gate(&self) -> &FreshnessGate {
        &self.gate
    }

    fn load(&self) -> Loaded<Project> {
        let mut loaded = load_directory(self.gate.path(), EXTENSION, |path| {
            parse_project(path, self.excerpt_length)
        });
        // `None` orders below every date.
        loaded
            .items
            .sort_by(|a, b| (b.date, &b.title).cmp(&(a.date, &a.title)));
        loaded
    }
}
