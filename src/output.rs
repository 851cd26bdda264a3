//! CLI output formatting for `check` and `build`.
//!
//! # Information-First Display
//!
//! Output is a content inventory. Every entity leads with its positional
//! index and title, with slugs, tags and sources as indented context lines.
//! Problems are gathered into one `Diagnostics` section at the end so they
//! are hard to miss.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Posts
//! 001 Async Notes (2024-02-10)
//!     Slug: async-notes
//!     Tags: rust, tokio
//! 002 Unfinished (2024-03-01) [draft]
//!     Slug: unfinished
//!
//! Projects
//! 001 Folio (2024-01-01) [featured]
//!     Slug: folio
//!
//! Terminals
//! 001 git (3 commands)
//!
//! Context
//!     Ada Lovelace <ada@example.com>
//!     3 timeline entries, 2 hobbies
//!
//! Diagnostics
//!     posts/broken.md: frontmatter error: ...
//!     Warning: about_me.timeline[2]: missing title
//!
//! Config
//!     folio.toml
//!     static/
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! /blog → blog/index.html
//! /blog/async-notes → blog/async-notes/index.html
//! Skipped /blog/..
//! Generated 14 pages, copied 3 static files → dist
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::config::CONFIG_FILENAME;
use crate::generate::GenerateReport;
use crate::loader::ParseFailure;
use crate::routes::shadowed_slugs;
use crate::site::Site;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: index, title, optional date and markers.
///
/// ```text
/// 001 Hello World (2024-01-30)
/// 002 Folio [featured]
/// ```
fn entity_header(index: usize, title: &str, date: &str, markers: &[&str]) -> String {
    let mut line = format!("{} {}", format_index(index), title);
    if !date.is_empty() {
        line.push_str(&format!(" ({date})"));
    }
    for marker in markers {
        line.push_str(&format!(" [{marker}]"));
    }
    line
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// `path` relative to `root` when possible.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn failure_line(failure: &ParseFailure, root: &Path) -> String {
    format!(
        "{}{}: {}",
        indent(1),
        display_path(&failure.path, root),
        failure.error
    )
}

// ============================================================================
// Check
// ============================================================================

/// Format the content inventory and every diagnostic for `folio check`.
pub fn format_check_output(site: &Site) -> Vec<String> {
    let mut lines = Vec::new();
    let root = site.root();

    lines.push("Posts".to_string());
    let posts = site.blog().get_all(true);
    if posts.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, post) in posts.iter().enumerate() {
        let markers: &[&str] = if post.is_draft { &["draft"] } else { &[] };
        lines.push(entity_header(i + 1, &post.title, &post.date_iso(), markers));
        lines.push(format!("{}Slug: {}", indent(1), post.slug));
        if !post.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), post.tags.join(", ")));
        }
    }

    lines.push(String::new());
    lines.push("Projects".to_string());
    let projects = site.projects().get_all(true);
    if projects.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, project) in projects.iter().enumerate() {
        let mut markers = Vec::new();
        if project.featured {
            markers.push("featured");
        }
        if project.is_draft {
            markers.push("draft");
        }
        lines.push(entity_header(i + 1, &project.title, &project.date_iso(), &markers));
        lines.push(format!("{}Slug: {}", indent(1), project.slug));
        if !project.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), project.tags.join(", ")));
        }
    }

    lines.push(String::new());
    lines.push("Terminals".to_string());
    let terminals = site.knowledge().terminals();
    if terminals.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, terminal) in terminals.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            terminal.title,
            plural(terminal.commands.len(), "command", "commands")
        ));
    }

    let context = site.context().context();
    lines.push(String::new());
    lines.push("Context".to_string());
    lines.push(format!(
        "{}{} <{}>",
        indent(1),
        context.personal_info.name,
        context.personal_info.email
    ));
    lines.push(format!(
        "{}{}, {}",
        indent(1),
        plural(context.about_me.timeline.len(), "timeline entry", "timeline entries"),
        plural(context.hobbies.len(), "hobby", "hobbies")
    ));

    let mut diagnostics: Vec<String> = Vec::new();
    for failure in &site.blog().snapshot().failures {
        diagnostics.push(failure_line(failure, root));
    }
    for failure in &site.projects().snapshot().failures {
        diagnostics.push(failure_line(failure, root));
    }
    for failure in &site.knowledge().snapshot().failures {
        diagnostics.push(failure_line(failure, root));
    }
    for warning in &context.warnings {
        diagnostics.push(format!("{}Warning: {}", indent(1), warning));
    }
    for shadowed in shadowed_slugs(site) {
        diagnostics.push(format!("{}Warning: {}", indent(1), shadowed));
    }
    if !diagnostics.is_empty() {
        lines.push(String::new());
        lines.push("Diagnostics".to_string());
        lines.extend(diagnostics);
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if root.join(CONFIG_FILENAME).exists() {
        lines.push(format!("{}{}", indent(1), CONFIG_FILENAME));
    } else {
        lines.push(format!("{}(stock defaults)", indent(1)));
    }
    let static_dir = &site.paths().static_dir;
    if static_dir.is_dir() {
        lines.push(format!("{}{}/", indent(1), display_path(static_dir, root)));
    }

    lines
}

/// Print check output to stdout.
pub fn print_check_output(site: &Site) {
    for line in format_check_output(site) {
        println!("{}", line);
    }
}

/// Number of units dropped across all best-effort engines.
pub fn failure_count(site: &Site) -> usize {
    site.blog().snapshot().failures.len()
        + site.projects().snapshot().failures.len()
        + site.knowledge().snapshot().failures.len()
}

// ============================================================================
// Build
// ============================================================================

/// Format the page list and totals for `folio build`.
pub fn format_build_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();
    for page in &report.pages {
        let label = if page.route == "/" {
            "Home"
        } else {
            page.route.as_str()
        };
        lines.push(format!("{} \u{2192} {}", label, page.file.display()));
    }
    for route in &report.skipped {
        lines.push(format!("Skipped {route}"));
    }
    lines.push(format!(
        "Generated {}, copied {} \u{2192} {}",
        plural(report.pages.len(), "page", "pages"),
        plural(report.static_files, "static file", "static files"),
        report.output_dir.display()
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &GenerateReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
