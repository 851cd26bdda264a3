//! Shared test utilities for the folio test suite.
//!
//! Provides fixture writers, a complete sample site, and lookup helpers that
//! panic with the list of available slugs on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_site();
//! let site = open_site(tmp.path(), false);
//!
//! let posts = site.blog().get_all(false);
//! assert_eq!(find_post(&posts, "hello-world").title, "Hello World");
//! ```

use serde_json::{Value, json};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tempfile::TempDir;

use crate::blog::BlogPost;
use crate::config::SiteConfig;
use crate::projects::Project;
use crate::site::Site;

// =========================================================================
// Fixture writers
// =========================================================================

/// Write `contents` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Set a file's modification time explicitly.
///
/// Staleness tests move mtimes forward instead of sleeping, so they never
/// depend on filesystem timestamp granularity.
pub fn set_mtime(path: &Path, when: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(when)
        .unwrap();
}

/// A valid context document exercising every derived field.
pub fn sample_context() -> Value {
    json!({
        "personal_info": {
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "title": "Software Engineer"
        },
        "about_me": {
            "professional_bio": [
                "I build developer tools.",
                "Previously: compilers."
            ],
            "timeline": [
                {
                    "type": "work",
                    "role": "Staff Engineer",
                    "organization": "Acme",
                    "description": "Platform team",
                    "start_date": "2021-03-01",
                    "start_precision": "month",
                    "is_current": true,
                    "highlights": ["Scaled the build farm"]
                },
                {
                    "type": "education",
                    "degree": "BSc Mathematics",
                    "organization": "University of London",
                    "start_date": "2015-01-01",
                    "start_precision": "year",
                    "end_date": "2019-06-15",
                    "end_precision": "day",
                    "is_current": false,
                    "thesis": { "link": "https://example.com/thesis.pdf" }
                },
                {
                    "type": "project",
                    "title": "Analytical Engine",
                    "start_date": "2019-09-01",
                    "start_precision": "month",
                    "end_date": "2020-01-01",
                    "end_precision": "month",
                    "is_current": false
                }
            ]
        },
        "contact": {
            "email": "ada@example.com",
            "location": "London",
            "socials": { "github": "https://github.com/ada" }
        },
        "hobbies": {
            "f1": { "background": "static/images/f1_bg.jpg", "label": "Formula 1" },
            "cooking": { "background": "cooking_bg.webp" }
        },
        "assets": {
            "images": { "profile": "images/profile.jpeg" },
            "files": { "resume": "resume.pdf" }
        }
    })
}

/// A complete site in a temp directory: posts (one draft), projects (one
/// featured), a knowledge base, a context document and a static file.
pub fn setup_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write_file(
        root,
        "posts/2024-01-30-hello-world.md",
        "---\ntitle: Hello World\ntags: Rust, Web\n---\n## Intro\n\nFirst post.\n",
    );
    write_file(
        root,
        "posts/2024-02-10-async-notes.md",
        "---\ntitle: Async Notes\ntags: [rust, tokio]\n---\nNotes on async.\n",
    );
    write_file(
        root,
        "posts/2024-03-01-unfinished.md",
        "---\ntitle: Unfinished\ndraft: true\ntags: [rust]\n---\nNot yet.\n",
    );

    write_file(
        root,
        "projects/folio.md",
        "---\ntitle: Folio\ndate: 2024-01-01\nfeatured: true\ntype: github\n\
         github_url: https://github.com/ada/folio\ntechnologies: Rust, maud\ntags: [rust]\n---\n\
         A portfolio engine.\n",
    );
    write_file(
        root,
        "projects/2023-05-01-dotfiles.md",
        "---\ntitle: Dotfiles\ntags: [shell]\n---\nConfig files.\n",
    );

    write_file(
        root,
        "data/knowledge_base.json",
        r#"{"terminals": [{"id": "git", "title": "git", "commands": [{"command": "git log --oneline", "comment": "history"}]}]}"#,
    );
    write_file(
        root,
        "data/personal_info.json",
        &serde_json::to_string_pretty(&sample_context()).unwrap(),
    );
    write_file(root, "static/css/site.css", "body { margin: 0; }\n");

    tmp
}

/// Open the sample site with stock config.
pub fn open_site(root: &Path, preview: bool) -> Site {
    let mut config = SiteConfig::default();
    config.serve.preview = preview;
    Site::open(root, config).unwrap()
}

// =========================================================================
// Lookups (panic with a clear message on miss)
// =========================================================================

/// Find a post by slug. Panics if not found.
pub fn find_post<'a>(posts: &'a [Arc<BlogPost>], slug: &str) -> &'a BlogPost {
    posts
        .iter()
        .find(|p| p.slug == slug)
        .map(|p| p.as_ref())
        .unwrap_or_else(|| {
            let slugs = post_slugs(posts);
            panic!("post '{slug}' not found. Available: {slugs:?}")
        })
}

/// Find a project by slug. Panics if not found.
pub fn find_project<'a>(projects: &'a [Arc<Project>], slug: &str) -> &'a Project {
    projects
        .iter()
        .find(|p| p.slug == slug)
        .map(|p| p.as_ref())
        .unwrap_or_else(|| {
            let slugs = project_slugs(projects);
            panic!("project '{slug}' not found. Available: {slugs:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Post slugs in collection order.
pub fn post_slugs(posts: &[Arc<BlogPost>]) -> Vec<&str> {
    posts.iter().map(|p| p.slug.as_str()).collect()
}

/// Project slugs in collection order.
pub fn project_slugs(projects: &[Arc<Project>]) -> Vec<&str> {
    projects.iter().map(|p| p.slug.as_str()).collect()
}
