//! Static site generation.
//!
//! Renders every page the route layer knows about into plain files, so the
//! site can be hosted without the dev server. Pages go through
//! [`routes::route`] exactly as a live request would; the build is a crawl of
//! the known paths, not a second set of templates.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # Home
//! ├── 404.html
//! ├── blog/
//! │   ├── index.html             # Post list
//! │   ├── hello-world/index.html # One post
//! │   └── tag/rust/index.html    # Posts tagged "rust"
//! ├── projects/
//! │   ├── index.html
//! │   ├── folio/index.html
//! │   └── tag/shell/index.html
//! ├── cv/index.html
//! └── static/                    # Copied verbatim from the site's static dir
//! ```
//!
//! Search is query-driven and has no static counterpart. Drafts are written
//! only when the site is in preview mode.

use crate::render::tag_href;
use crate::routes::{self, Reply};
use crate::site::Site;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to render {route}: {message}")]
    Render { route: String, message: String },
}

/// One written page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPage {
    pub route: String,
    /// Relative to the output directory.
    pub file: PathBuf,
}

/// What a build wrote.
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    pub output_dir: PathBuf,
    pub pages: Vec<GeneratedPage>,
    /// Routes that had no page or an unsafe path.
    pub skipped: Vec<String>,
    pub static_files: usize,
}

/// Every page path the site currently serves, home first.
pub fn site_routes(site: &Site) -> Vec<String> {
    let preview = site.preview();
    let mut paths = vec!["/".to_string(), "/blog".to_string()];

    for post in site.blog().get_all(preview) {
        paths.push(format!("/blog/{}", urlencoding::encode(&post.slug)));
    }
    for (tag, _) in site.blog().get_all_tags() {
        paths.push(tag_href("/blog", &tag));
    }

    paths.push("/projects".to_string());
    for project in site.projects().get_all(preview) {
        paths.push(format!("/projects/{}", urlencoding::encode(&project.slug)));
    }
    for (tag, _) in site.projects().get_all_tags() {
        paths.push(tag_href("/projects", &tag));
    }

    paths.push("/cv".to_string());
    paths
}

/// Where a route's page lands: `/` → `index.html`, `/a/b` → `a/b/index.html`.
///
/// Returns `None` when a decoded segment would escape the output directory.
pub fn output_path(route: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for raw in route.split('/').filter(|s| !s.is_empty()) {
        let segment = urlencoding::decode(raw).ok()?;
        let part = Path::new(segment.as_ref());
        let mut components = part.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !segment.starts_with('.') => path.push(part),
            _ => return None,
        }
    }
    path.push("index.html");
    Some(path)
}

pub fn generate(site: &Site, output_dir: &Path) -> Result<GenerateReport, GenerateError> {
    fs::create_dir_all(output_dir)?;
    let mut report = GenerateReport {
        output_dir: output_dir.to_path_buf(),
        ..Default::default()
    };

    for route in site_routes(site) {
        let Some(relative) = output_path(&route) else {
            warn!(%route, "skipping page with unsafe path");
            report.skipped.push(route);
            continue;
        };
        match routes::route(site, &route, None) {
            Reply::Html(body) => {
                let file = output_dir.join(&relative);
                if let Some(parent) = file.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&file, body)?;
                debug!(%route, file = %relative.display(), "page written");
                report.pages.push(GeneratedPage {
                    route,
                    file: relative,
                });
            }
            Reply::Error(message) => return Err(GenerateError::Render { route, message }),
            other => {
                warn!(%route, status = other.status(), "no page for route");
                report.skipped.push(route);
            }
        }
    }

    fs::write(
        output_dir.join("404.html"),
        routes::not_found_page(site, ""),
    )?;

    let static_dir = &site.paths().static_dir;
    if static_dir.is_dir() {
        let target = output_dir.join("static");
        fs::create_dir_all(&target)?;
        report.static_files = copy_dir_recursive(static_dir, &target)?;
    }

    info!(
        pages = report.pages.len(),
        static_files = report.static_files,
        output = %output_dir.display(),
        "site generated"
    );
    Ok(report)
}

/// Copy a directory tree, skipping hidden entries. Returns the file count.
fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<usize> {
    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copied += copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// ============================================================================
// Tests
// ============================================================================
