//! Request routing as a pure function of the site and the request path.
//!
//! [`route`] maps a path and query string to a [`Reply`] without touching the
//! network, so the dev server and the static build share one code path and
//! tests can drive every route directly.
//!
//! ```text
//! /                               home page
//! /blog                           post list
//! /blog/tag/<tag>                 posts with a tag (case-insensitive)
//! /blog/search?q=<text>           substring search
//! /blog/<slug>                    one post with related posts
//! /projects                       project list
//! /projects/tag/<tag>             projects with a tag
//! /projects/<slug>                one project
//! /cv                             timeline, contact, downloads
//! /static/<path>                  files under the static directory
//! /api/posts[/recent|/<slug>[/related]]
//! /api/tags
//! /api/projects[/featured|/<slug>]
//! /api/terminals
//! ```
//!
//! Drafts appear in listings and resolve by slug only in preview mode. A
//! trailing slash redirects to the bare path.
//!
//! Fixed segments win over slugs, so a post slugged `search` or `recent`, or
//! a project slugged `featured`, is shadowed on one route. [`shadowed_slugs`]
//! reports them.

use crate::render::{self, HomePage};
use crate::site::Site;
use crate::types::{PostRecord, ProjectRecord, TagCount, TerminalRecord, records};
use maud::Markup;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::error;

/// What a request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Html(String),
    Json(String),
    /// A file on disk, already confined to the static directory.
    File(PathBuf),
    NotFound,
    Redirect(String),
    /// Rendering failed; the message is for the log, not the visitor.
    Error(String),
}

impl Reply {
    pub fn status(&self) -> u16 {
        match self {
            Reply::Html(_) | Reply::Json(_) | Reply::File(_) => 200,
            Reply::NotFound => 404,
            Reply::Redirect(_) => 301,
            Reply::Error(_) => 500,
        }
    }
}

fn html(markup: Markup) -> Reply {
    Reply::Html(markup.into_string())
}

fn json<T: Serialize>(value: &T) -> Reply {
    match serde_json::to_string_pretty(value) {
        Ok(body) => Reply::Json(body),
        Err(e) => {
            error!(error = %e, "failed to serialize response");
            Reply::Error(e.to_string())
        }
    }
}

/// Decode one path segment or query value; `+` reads as a space in queries.
fn decode(raw: &str) -> Option<Cow<'_, str>> {
    urlencoding::decode(raw).ok()
}

/// Look up `key` in a raw query string.
pub fn query_param(query: Option<&str>, key: &str) -> Option<String> {
    query?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        if k != key {
            return None;
        }
        let spaced = v.replace('+', " ");
        decode(&spaced).map(Cow::into_owned)
    })
}

/// Resolve a request. `path` and `query` are raw, still percent-encoded.
pub fn route(site: &Site, path: &str, query: Option<&str>) -> Reply {
    if path.len() > 1 && path.ends_with('/') {
        let bare = path.trim_end_matches('/');
        let target = if bare.is_empty() { "/" } else { bare };
        return Reply::Redirect(match query {
            Some(q) => format!("{target}?{q}"),
            None => target.to_string(),
        });
    }

    let mut decoded = Vec::new();
    for raw in path.split('/').filter(|s| !s.is_empty()) {
        match decode(raw) {
            Some(segment) => decoded.push(segment.into_owned()),
            None => return Reply::NotFound,
        }
    }
    let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();

    match segments.as_slice() {
        [] | ["index.html"] => home(site),
        ["blog"] => post_list(site, None),
        ["blog", "tag", tag] => post_list(site, Some(*tag)),
        ["blog", "search"] => search(site, &query_param(query, "q").unwrap_or_default()),
        ["blog", slug] => post(site, slug),
        ["projects"] => project_list(site, None),
        ["projects", "tag", tag] => project_list(site, Some(*tag)),
        ["projects", slug] => project(site, slug),
        ["cv"] => cv(site),
        ["static", rest @ ..] => static_file(&site.paths().static_dir, rest),
        ["api", rest @ ..] => api(site, rest, query),
        _ => Reply::NotFound,
    }
}

/// Post slugs that collide with a fixed route, and the route that wins.
const RESERVED_POST_SLUGS: [(&str, &str); 2] = [
    ("search", "/blog/search"),
    ("recent", "/api/posts/recent"),
];

/// Project slugs that collide with a fixed route, and the route that wins.
const RESERVED_PROJECT_SLUGS: [(&str, &str); 1] = [("featured", "/api/projects/featured")];

/// One line per loaded entity whose slug a fixed route shadows.
pub fn shadowed_slugs(site: &Site) -> Vec<String> {
    let mut found = Vec::new();
    for post in site.blog().get_all(true) {
        for (slug, path) in RESERVED_POST_SLUGS {
            if post.slug == slug {
                found.push(format!("post slug '{slug}' is shadowed by {path}"));
            }
        }
    }
    for project in site.projects().get_all(true) {
        for (slug, path) in RESERVED_PROJECT_SLUGS {
            if project.slug == slug {
                found.push(format!("project slug '{slug}' is shadowed by {path}"));
            }
        }
    }
    found
}

/// The body for a 404, for callers that want a page rather than a bare status.
pub fn not_found_page(site: &Site, path: &str) -> String {
    render::render_not_found(&site.config().site.title, path).into_string()
}

// ============================================================================
// Lookups shared by pages and the JSON API
// ============================================================================

fn visible_post(site: &Site, slug: &str) -> Option<PostRecord> {
    site.blog()
        .get_by_slug(slug)
        .filter(|p| site.preview() || !p.is_draft)
        .map(|p| PostRecord::from(p.as_ref()))
}

fn visible_project(site: &Site, slug: &str) -> Option<ProjectRecord> {
    site.projects()
        .get_by_slug(slug)
        .filter(|p| site.preview() || !p.is_draft)
        .map(|p| ProjectRecord::from(p.as_ref()))
}

fn related_posts(site: &Site, slug: &str) -> Option<Vec<PostRecord>> {
    let post = site
        .blog()
        .get_by_slug(slug)
        .filter(|p| site.preview() || !p.is_draft)?;
    let limit = site.config().blog.related_limit;
    Some(records(&site.blog().get_related(&post, limit)))
}

fn tag_counts(counts: Vec<(String, usize)>) -> Vec<TagCount> {
    counts.into_iter().map(TagCount::from).collect()
}

fn limit_param(query: Option<&str>, default: usize) -> usize {
    query_param(query, "limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Pages
// ============================================================================

fn home(site: &Site) -> Reply {
    let context = site.context().context();
    let recent: Vec<PostRecord> = records(&site.blog().get_recent(site.config().blog.recent_limit));
    let featured: Vec<ProjectRecord> =
        records(&site.projects().get_featured(site.config().projects.featured_limit));
    let terminals: Vec<TerminalRecord> = records(&site.knowledge().terminals());

    html(render::render_home(
        &site.config().site.title,
        &HomePage {
            context: &context,
            recent: &recent,
            featured: &featured,
            terminals: &terminals,
        },
    ))
}

fn post_list(site: &Site, tag: Option<&str>) -> Reply {
    let posts = match tag {
        Some(t) => site.blog().get_by_tag(t),
        None => site.blog().get_all(site.preview()),
    };
    if tag.is_some() && posts.is_empty() {
        return Reply::NotFound;
    }
    let posts: Vec<PostRecord> = records(&posts);
    let tags = tag_counts(site.blog().get_all_tags());
    html(render::render_post_list(&site.config().site.title, tag, &posts, &tags))
}

fn search(site: &Site, query: &str) -> Reply {
    let results: Vec<PostRecord> = records(&site.blog().search(query));
    html(render::render_search(&site.config().site.title, query, &results))
}

fn post(site: &Site, slug: &str) -> Reply {
    let Some(post) = visible_post(site, slug) else {
        return Reply::NotFound;
    };
    let related = related_posts(site, slug).unwrap_or_default();
    html(render::render_post(&site.config().site.title, &post, &related))
}

fn project_list(site: &Site, tag: Option<&str>) -> Reply {
    let projects = match tag {
        Some(t) => site.projects().get_by_tag(t),
        None => site.projects().get_all(site.preview()),
    };
    if tag.is_some() && projects.is_empty() {
        return Reply::NotFound;
    }
    let projects: Vec<ProjectRecord> = records(&projects);
    let tags = tag_counts(site.projects().get_all_tags());
    html(render::render_project_list(&site.config().site.title, tag, &projects, &tags))
}

fn project(site: &Site, slug: &str) -> Reply {
    match visible_project(site, slug) {
        Some(project) => html(render::render_project(&site.config().site.title, &project)),
        None => Reply::NotFound,
    }
}

/// Downloads from the context's `assets.files`, overridden by `[site] files`.
pub fn download_files(site: &Site) -> BTreeMap<String, String> {
    let mut files = site.context().context().assets.files.clone();
    files.extend(site.config().site.files.clone());
    files
}

fn cv(site: &Site) -> Reply {
    let context = site.context().context();
    html(render::render_cv(
        &site.config().site.title,
        &context,
        &download_files(site),
    ))
}

/// Serve `segments` from `root`, refusing anything that could leave it.
fn static_file(root: &Path, segments: &[&str]) -> Reply {
    if segments.is_empty() {
        return Reply::NotFound;
    }
    let mut relative = PathBuf::new();
    for segment in segments {
        let part = Path::new(segment);
        let mut components = part.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => relative.push(part),
            _ => return Reply::NotFound,
        }
    }
    if segments.iter().any(|s| s.starts_with('.') || s.contains('\\')) {
        return Reply::NotFound;
    }

    let candidate = root.join(&relative);
    // Symlinks may still point outside the root.
    match (candidate.canonicalize(), root.canonicalize()) {
        (Ok(file), Ok(base)) if file.starts_with(&base) && file.is_file() => Reply::File(file),
        _ => Reply::NotFound,
    }
}

// ============================================================================
// JSON API
// ============================================================================

fn api(site: &Site, segments: &[&str], query: Option<&str>) -> Reply {
    match segments {
        ["posts"] => json(&records::<_, PostRecord>(&site.blog().get_all(site.preview()))),
        ["posts", "recent"] => {
            let limit = limit_param(query, site.config().blog.recent_limit);
            json(&records::<_, PostRecord>(&site.blog().get_recent(limit)))
        }
        ["posts", slug] => visible_post(site, slug).map_or(Reply::NotFound, |p| json(&p)),
        ["posts", slug, "related"] => related_posts(site, slug).map_or(Reply::NotFound, |r| json(&r)),
        ["tags"] => json(&tag_counts(site.blog().get_all_tags())),
        ["projects"] => json(&records::<_, ProjectRecord>(&site.projects().get_all(site.preview()))),
        ["projects", "featured"] => {
            let limit = limit_param(query, site.config().projects.featured_limit);
            json(&records::<_, ProjectRecord>(&site.projects().get_featured(limit)))
        }
        ["projects", slug] => visible_project(site, slug).map_or(Reply::NotFound, |p| json(&p)),
        ["terminals"] => json(&records::<_, TerminalRecord>(&site.knowledge().terminals())),
        _ => Reply::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{open_site, setup_site, write_file};
    use serde_json::Value;

    fn body(reply: Reply) -> String {
        match reply {
            Reply::Html(s) | Reply::Json(s) => s,
            other => panic!("expected a body, got {other:?}"),
        }
    }

    fn api_json(site: &Site, path: &str) -> Value {
        serde_json::from_str(&body(route(site, path, None))).unwrap()
    }

    fn slugs(value: &Value) -> Vec<&str> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["slug"].as_str().unwrap())
            .collect()
    }

    // =========================================================================
    // Query strings
    // =========================================================================

    #[test]
    fn query_param_decodes_values() {
        assert_eq!(query_param(Some("q=hello+world"), "q").as_deref(), Some("hello world"));
        assert_eq!(query_param(Some("a=1&q=caf%C3%A9"), "q").as_deref(), Some("café"));
        assert_eq!(query_param(Some("q"), "q").as_deref(), Some(""));
        assert_eq!(query_param(Some("x=1"), "q"), None);
        assert_eq!(query_param(None, "q"), None);
    }

    // =========================================================================
    // Pages
    // =========================================================================

    #[test]
    fn home_page_renders() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        let html = body(route(&site, "/", None));
        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains("Async Notes"));
        assert!(html.contains("git log --oneline"));
        assert!(!html.contains("Unfinished"));
    }

    #[test]
    fn trailing_slash_redirects() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        assert_eq!(route(&site, "/blog/", None), Reply::Redirect("/blog".into()));
        assert_eq!(
            route(&site, "/blog/search/", Some("q=x")),
            Reply::Redirect("/blog/search?q=x".into())
        );
    }

    #[test]
    fn post_page_with_related() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        let html = body(route(&site, "/blog/hello-world", None));
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("Related posts"));
        assert!(html.contains(r#"href="/blog/async-notes""#));
    }

    #[test]
    fn draft_hidden_outside_preview() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        assert_eq!(route(&site, "/blog/unfinished", None), Reply::NotFound);
        assert_eq!(route(&site, "/api/posts/unfinished", None), Reply::NotFound);
        assert_eq!(route(&site, "/api/posts/unfinished/related", None), Reply::NotFound);

        let preview = open_site(tmp.path(), true);
        assert!(matches!(route(&preview, "/blog/unfinished", None), Reply::Html(_)));
        assert_eq!(slugs(&api_json(&preview, "/api/posts")).len(), 3);
    }

    #[test]
    fn tag_pages_are_case_insensitive() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        let html = body(route(&site, "/blog/tag/RUST", None));
        assert!(html.contains("Hello World"));
        assert!(html.contains("Async Notes"));
        assert_eq!(route(&site, "/blog/tag/cobol", None), Reply::NotFound);
    }

    #[test]
    fn encoded_tag_segment_is_decoded() {
        let tmp = setup_site();
        write_file(
            tmp.path(),
            "posts/2024-04-01-ml.md",
            "---\ntitle: ML\ntags: [Machine Learning]\n---\nx\n",
        );
        let site = open_site(tmp.path(), false);
        let html = body(route(&site, "/blog/tag/machine%20learning", None));
        assert!(html.contains("<a href=\"/blog/ml\">ML</a>"));
    }

    #[test]
    fn search_page_uses_query() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        let html = body(route(&site, "/blog/search", Some("q=ASYNC")));
        assert!(html.contains("1 result"));
        assert!(html.contains("Async Notes"));
    }

    #[test]
    fn project_pages() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        assert!(body(route(&site, "/projects", None)).contains("Dotfiles"));
        assert!(body(route(&site, "/projects/folio", None)).contains("Built with Rust, maud"));
        assert!(body(route(&site, "/projects/tag/shell", None)).contains("Dotfiles"));
        assert_eq!(route(&site, "/projects/nope", None), Reply::NotFound);
    }

    #[test]
    fn cv_page_merges_download_files() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        let files = download_files(&site);
        assert_eq!(files.get("resume").map(String::as_str), Some("resume.pdf"));
        let html = body(route(&site, "/cv", None));
        assert!(html.contains(r#"href="/static/resume.pdf""#));
    }

    #[test]
    fn unknown_path_is_not_found() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        assert_eq!(route(&site, "/wp-admin", None), Reply::NotFound);
        assert_eq!(Reply::NotFound.status(), 404);
        assert!(not_found_page(&site, "/wp-admin").contains("/wp-admin"));
    }

    #[test]
    fn reserved_slugs_reported() {
        let tmp = setup_site();
        write_file(tmp.path(), "posts/2024-05-01-search.md", "---\ntitle: On Search\n---\nx\n");
        write_file(tmp.path(), "projects/featured.md", "---\ntitle: Featured\n---\nx\n");
        let site = open_site(tmp.path(), false);

        assert_eq!(
            shadowed_slugs(&site),
            vec![
                "post slug 'search' is shadowed by /blog/search",
                "project slug 'featured' is shadowed by /api/projects/featured",
            ]
        );
        assert!(body(route(&site, "/blog/search", None)).contains("search-page"));
        // The page route for the project still resolves.
        assert!(body(route(&site, "/projects/featured", None)).contains("<h1>Featured</h1>"));
    }

    #[test]
    fn no_reserved_slugs_in_sample_site() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        assert!(shadowed_slugs(&site).is_empty());
    }

    // =========================================================================
    // Static files
    // =========================================================================

    #[test]
    fn static_file_served() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        match route(&site, "/static/css/site.css", None) {
            Reply::File(path) => assert!(path.ends_with("static/css/site.css")),
            other => panic!("expected file, got {other:?}"),
        }
    }

    #[test]
    fn static_traversal_refused() {
        let tmp = setup_site();
        write_file(tmp.path(), "secret.txt", "nope");
        let site = open_site(tmp.path(), false);

        assert_eq!(route(&site, "/static/../secret.txt", None), Reply::NotFound);
        assert_eq!(route(&site, "/static/%2E%2E/secret.txt", None), Reply::NotFound);
        assert_eq!(route(&site, "/static/css%2F..%2F..%2Fsecret.txt", None), Reply::NotFound);
        assert_eq!(route(&site, "/static/.hidden", None), Reply::NotFound);
        assert_eq!(route(&site, "/static/css", None), Reply::NotFound);
        assert_eq!(route(&site, "/static", None), Reply::NotFound);
    }

    // =========================================================================
    // JSON API
    // =========================================================================

    #[test]
    fn api_posts_and_recent() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        assert_eq!(slugs(&api_json(&site, "/api/posts")), vec!["async-notes", "hello-world"]);

        let recent: Value =
            serde_json::from_str(&body(route(&site, "/api/posts/recent", Some("limit=1")))).unwrap();
        assert_eq!(slugs(&recent), vec!["async-notes"]);
    }

    #[test]
    fn api_post_and_related() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        let post = api_json(&site, "/api/posts/hello-world");
        assert_eq!(post["title"], "Hello World");
        assert_eq!(post["date"], "2024-01-30");

        let related = api_json(&site, "/api/posts/hello-world/related");
        assert_eq!(slugs(&related), vec!["async-notes"]);
        assert_eq!(route(&site, "/api/posts/nope", None), Reply::NotFound);
    }

    #[test]
    fn api_tags_exclude_drafts() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        let tags = api_json(&site, "/api/tags");
        assert_eq!(tags[0], serde_json::json!({"tag": "rust", "count": 2}));
        assert_eq!(tags.as_array().unwrap().len(), 3);
    }

    #[test]
    fn api_projects_and_featured() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        assert_eq!(slugs(&api_json(&site, "/api/projects")), vec!["folio", "dotfiles"]);
        let featured = api_json(&site, "/api/projects/featured");
        assert_eq!(slugs(&featured), vec!["folio", "dotfiles"]);
        assert_eq!(api_json(&site, "/api/projects/folio")["type"], "github");
    }

    #[test]
    fn api_terminals() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        let terminals = api_json(&site, "/api/terminals");
        assert_eq!(terminals[0]["id"], "git");
        assert_eq!(terminals[0]["commands"][0]["comment"], "history");
    }
}
