//! Blog posts: Markdown files with frontmatter in the posts directory.
//!
//! ```text
//! posts/2024-01-30-hello-world.md
//! ---
//! title: Hello World
//! tags: rust, web
//! ---
//! Body in **Markdown**.
//! ```
//!
//! Becomes a [`BlogPost`] with slug `hello-world` and date 2024-01-30. Field
//! resolution follows [`crate::metadata`]; headings get permalink anchors and
//! feed the post's table of contents.
//!
//! The collection is sorted newest first. Posts sharing a date keep filename
//! order.

use crate::config::BlogConfig;
use crate::engine::ContentEngine;
use crate::freshness::FreshnessGate;
use crate::frontmatter::{self, ListField, null_as_default, scalar_string};
use crate::loader::{Loaded, Loader, ParseError, load_directory};
use crate::markdown::{self, Anchors, TocEntry};
use crate::metadata;
use crate::naming::{file_stem, parse_entry_name};
use crate::query::Entry;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "md";
const UNTITLED: &str = "Untitled";

pub type BlogEngine = ContentEngine<PostLoader>;

#[derive(Debug, Clone)]
pub struct BlogPost {
    pub slug: String,
    pub title: String,
    pub date: NaiveDate,
    pub content_raw: String,
    pub content_html: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub author: String,
    pub featured_image: Option<String>,
    pub reading_time: u32,
    pub is_draft: bool,
    /// Headings of level 2 to 4, in document order.
    pub toc: Vec<TocEntry>,
    /// Frontmatter keys not modeled above.
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl BlogPost {
    pub fn date_formatted(&self) -> String {
        metadata::format_long(self.date)
    }

    pub fn date_iso(&self) -> String {
        metadata::format_iso(self.date)
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }
}

impl Entry for BlogPost {
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
struct PostFrontmatter {
    #[serde(deserialize_with = "scalar_string")]
    title: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    date: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    slug: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    tags: ListField,
    #[serde(deserialize_with = "null_as_default")]
    draft: bool,
    #[serde(deserialize_with = "scalar_string")]
    excerpt: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    description: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    author: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    featured_image: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    image: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

/// Settings a post parse needs, taken from `[blog]`.
#[derive(Debug, Clone)]
pub struct PostSettings {
    pub default_author: String,
    pub excerpt_length: usize,
    pub words_per_minute: usize,
}

impl From<&BlogConfig> for PostSettings {
    fn from(config: &BlogConfig) -> Self {
        Self {
            default_author: config.default_author.clone(),
            excerpt_length: config.excerpt_length,
            words_per_minute: config.words_per_minute,
        }
    }
}

/// Parse one post file.
pub fn parse_post(path: &Path, settings: &PostSettings) -> Result<BlogPost, ParseError> {
    let source = fs::read_to_string(path)?;
    let (fm, body): (PostFrontmatter, String) = frontmatter::parse(&source)?;
    let name = parse_entry_name(&file_stem(path));

    let date = match fm.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => {
            metadata::parse_date(raw).ok_or_else(|| ParseError::InvalidDate(raw.to_string()))?
        }
        None => match name.date {
            Some(date) => date,
            None => metadata::modified_date(path)?,
        },
    };

    let rendered = markdown::render(&body, Anchors::Permalinks);
    let excerpt = metadata::resolve(&[fm.excerpt.as_deref(), fm.description.as_deref()])
        .unwrap_or_else(|| markdown::excerpt(&rendered.html, settings.excerpt_length));

    Ok(BlogPost {
        slug: metadata::resolve(&[fm.slug.as_deref()]).unwrap_or(name.slug),
        title: metadata::resolve(&[fm.title.as_deref()]).unwrap_or_else(|| UNTITLED.into()),
        date,
        excerpt,
        tags: fm.tags.into_vec(),
        author: metadata::resolve(&[fm.author.as_deref()])
            .unwrap_or_else(|| settings.default_author.clone()),
        featured_image: metadata::resolve(&[fm.featured_image.as_deref(), fm.image.as_deref()]),
        reading_time: markdown::reading_time(&body, settings.words_per_minute),
        is_draft: fm.draft,
        toc: rendered.toc,
        content_html: rendered.html,
        content_raw: body,
        meta: fm.extra,
    })
}

/// Loads the posts directory.
pub struct PostLoader {
    gate: FreshnessGate,
    settings: PostSettings,
}

impl PostLoader {
    pub fn new(dir: impl Into<PathBuf>, settings: PostSettings) -> Self {
        Self {
            gate: FreshnessGate::directory(dir, EXTENSION),
            settings,
        }
    }
}

impl Loader for PostLoader {
    type Item = BlogPost;

    fn gate(&self) -> &FreshnessGate {
        &self.gate
    }

    fn load(&self) -> Loaded<BlogPost> {
        let mut loaded = load_directory(self.gate.path(), EXTENSION, |path| {
            parse_post(path, &self.settings)
        });
        loaded.items.sort_by(|a, b| b.date.cmp(&a.date));
        loaded
    }
}
