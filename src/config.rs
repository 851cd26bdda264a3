//! Site configuration module.
//!
//! Handles loading, validating, and merging `folio.toml`. The file is sparse:
//! user values are merged on top of the stock defaults, so a site only needs to
//! mention the keys it wants to change.
//!
//! ## Config File Location
//!
//! `folio.toml` lives in the site root, next to the content directories:
//!
//! ```text
//! site/
//! ├── folio.toml                   # Site config (optional)
//! ├── posts/                       # Blog posts (Markdown + frontmatter)
//! ├── projects/                    # Project pages (Markdown + frontmatter)
//! ├── data/
//! │   ├── knowledge_base.json      # Terminal snippets
//! │   └── personal_info.json       # Personal context (strictly validated)
//! └── static/                      # Served under /static/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! [content]
//! posts_dir = "posts"
//! projects_dir = "projects"
//! knowledge_base = "data/knowledge_base.json"
//! context = "data/personal_info.json"
//! static_dir = "static"
//!
//! [site]
//! title = "Portfolio"
//!
//! [site.files]
//! resume = "resume.pdf"
//!
//! [blog]
//! default_author = "Anonymous"
//! excerpt_length = 160
//! words_per_minute = 200
//! recent_limit = 5
//! related_limit = 3
//!
//! [projects]
//! excerpt_length = 200
//! featured_limit = 3
//!
//! [serve]
//! interface = "127.0.0.1"
//! port = 5000
//! preview = false
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the site root.
pub const CONFIG_FILENAME: &str = "folio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `folio.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Where each content source lives, relative to the site root.
    pub content: ContentConfig,
    /// Site-wide presentation settings.
    pub site: SiteSection,
    /// Blog engine settings.
    pub blog: BlogConfig,
    /// Projects engine settings.
    pub projects: ProjectsConfig,
    /// Development server settings.
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blog.excerpt_length == 0 {
            return Err(ConfigError::Validation(
                "blog.excerpt_length must be greater than 0".into(),
            ));
        }
        if self.blog.words_per_minute == 0 {
            return Err(ConfigError::Validation(
                "blog.words_per_minute must be greater than 0".into(),
            ));
        }
        if self.projects.excerpt_length == 0 {
            return Err(ConfigError::Validation(
                "projects.excerpt_length must be greater than 0".into(),
            ));
        }
        if self.serve.interface.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "serve.interface is not an IP address: {}",
                self.serve.interface
            )));
        }
        Ok(())
    }
}

/// Locations of the content sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Directory of blog post Markdown files.
    pub posts_dir: PathBuf,
    /// Directory of project Markdown files.
    pub projects_dir: PathBuf,
    /// Knowledge-base JSON document.
    pub knowledge_base: PathBuf,
    /// Personal context JSON document.
    pub context: PathBuf,
    /// Static assets served under `/static/`.
    pub static_dir: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            posts_dir: PathBuf::from("posts"),
            projects_dir: PathBuf::from("projects"),
            knowledge_base: PathBuf::from("data/knowledge_base.json"),
            context: PathBuf::from("data/personal_info.json"),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl ContentConfig {
    /// Resolve every content path against the site root.
    pub fn resolve(&self, root: &Path) -> ContentConfig {
        ContentConfig {
            posts_dir: root.join(&self.posts_dir),
            projects_dir: root.join(&self.projects_dir),
            knowledge_base: root.join(&self.knowledge_base),
            context: root.join(&self.context),
            static_dir: root.join(&self.static_dir),
        }
    }
}

/// Site-wide presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Title used in the `<title>` of pages without their own.
    pub title: String,
    /// Downloadable files linked from the CV page, name → path under static.
    pub files: BTreeMap<String, String>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            files: BTreeMap::new(),
        }
    }
}

/// Blog engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// Author used when a post doesn't name one.
    pub default_author: String,
    /// Character budget for computed excerpts.
    pub excerpt_length: usize,
    /// Reading speed used for the reading-time estimate.
    pub words_per_minute: usize,
    /// Number of posts shown on the home page.
    pub recent_limit: usize,
    /// Number of related posts shown under a post.
    pub related_limit: usize,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            default_author: "Anonymous".to_string(),
            excerpt_length: 160,
            words_per_minute: 200,
            recent_limit: 5,
            related_limit: 3,
        }
    }
}

/// Projects engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectsConfig {
    /// Character budget for computed descriptions.
    pub excerpt_length: usize,
    /// Number of projects shown on the home page.
    pub featured_limit: usize,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            excerpt_length: 200,
            featured_limit: 3,
        }
    }
}

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    /// Interface to bind.
    pub interface: String,
    /// Port to bind.
    pub port: u16,
    /// Expose drafts in listings and lookups.
    pub preview: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: "127.0.0.1".to_string(),
            port: 5000,
            preview: false,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `folio.toml` from the site root as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `folio.toml` in the site root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(load_raw_config(root)?)
}

/// Returns a fully-commented stock `folio.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Content sources (relative to the site root)
# ---------------------------------------------------------------------------
[content]
# Markdown blog posts. Filenames like 2024-01-30-hello.md give the date and slug.
posts_dir = "posts"
# Markdown project pages.
projects_dir = "projects"
# Terminal snippets shown on the home page.
knowledge_base = "data/knowledge_base.json"
# Personal context: bio, timeline, contact. Must validate or the site won't start.
context = "data/personal_info.json"
# Served as-is under /static/.
static_dir = "static"

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
title = "Portfolio"

# Downloadable files linked from the CV page (name = path under static_dir).
[site.files]
# resume = "resume.pdf"

# ---------------------------------------------------------------------------
# Blog
# ---------------------------------------------------------------------------
[blog]
# Used when a post has no `author` in its frontmatter.
default_author = "Anonymous"
# Maximum characters in a computed excerpt (cut at a word boundary).
excerpt_length = 160
# Reading speed for the "N min read" estimate.
words_per_minute = 200
# Posts shown on the home page.
recent_limit = 5
# Related posts shown under each post.
related_limit = 3

# ---------------------------------------------------------------------------
# Projects
# ---------------------------------------------------------------------------
[projects]
# Maximum characters in a computed description.
excerpt_length = 200
# Projects shown on the home page (featured first, padded with recent ones).
featured_limit = 3

# ---------------------------------------------------------------------------
# Development server
# ---------------------------------------------------------------------------
[serve]
interface = "127.0.0.1"
port = 5000
# Show drafts in listings and allow opening them by slug.
preview = false
"##
}
