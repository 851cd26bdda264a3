//! HTML pages rendered with maud.
//!
//! Every page takes plain records (see [`crate::types`]) or the derived
//! context, never engine entities, and returns [`Markup`]. The stylesheet is
//! embedded at compile time.
//!
//! ## Pages
//!
//! | Function | Route |
//! |----------|-------|
//! | [`render_home`] | `/` |
//! | [`render_post_list`] | `/blog`, `/blog/tag/<tag>` |
//! | [`render_search`] | `/blog/search?q=` |
//! | [`render_post`] | `/blog/<slug>` |
//! | [`render_project_list`] | `/projects`, `/projects/tag/<tag>` |
//! | [`render_project`] | `/projects/<slug>` |
//! | [`render_cv`] | `/cv` |
//! | [`render_not_found`] | anything else |
//!
//! Links are root-relative and never carry a trailing slash, so the same
//! markup works behind the dev server and from a static build.

use crate::context::{Context, TimelineEntry};
use crate::types::{PostRecord, ProjectRecord, TagCount, TerminalRecord};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::BTreeMap;

const CSS: &str = include_str!("../static/style.css");

/// Top-level areas of the site, used to highlight the nav.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Home,
    Blog,
    Projects,
    Cv,
}

const NAV: [(Section, &str, &str); 4] = [
    (Section::Home, "/", "Home"),
    (Section::Blog, "/blog", "Blog"),
    (Section::Projects, "/projects", "Projects"),
    (Section::Cv, "/cv", "CV"),
];

/// Everything the home page shows.
pub struct HomePage<'a> {
    pub context: &'a Context,
    pub recent: &'a [PostRecord],
    pub featured: &'a [ProjectRecord],
    pub terminals: &'a [TerminalRecord],
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
pub fn base_document(title: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Renders the site header with breadcrumb and navigation
fn site_header(breadcrumb: Markup, nav: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                (breadcrumb)
            }
            nav.site-nav {
                (nav)
            }
        }
    }
}

pub fn render_nav(current: Section) -> Markup {
    html! {
        ul {
            @for (section, href, label) in NAV {
                li class=[(section == current).then_some("current")] {
                    a href=(href) { (label) }
                }
            }
        }
    }
}

/// Site title, then each `(href, label)` crumb.
fn breadcrumb(site_title: &str, trail: &[(&str, &str)]) -> Markup {
    html! {
        a href="/" { (site_title) }
        @for (href, label) in trail {
            span.sep { "/" }
            a href=(href) { (label) }
        }
    }
}

/// Full page: document, header, and a `main` with the given class.
fn page(
    site_title: &str,
    title: Option<&str>,
    section: Section,
    trail: &[(&str, &str)],
    main_class: &str,
    content: Markup,
) -> Markup {
    let full_title = match title {
        Some(t) => format!("{t} | {site_title}"),
        None => site_title.to_string(),
    };
    let body = html! {
        (site_header(breadcrumb(site_title, trail), render_nav(section)))
        main class=(main_class) {
            (content)
        }
    };
    base_document(&full_title, None, body)
}

/// URL of a tag page under `base` (`/blog` or `/projects`).
pub fn tag_href(base: &str, tag: &str) -> String {
    format!("{base}/tag/{}", urlencoding::encode(&tag.to_lowercase()))
}

/// URL of a file under the static directory.
pub fn static_url(path: &str) -> String {
    format!("/static/{}", path.trim_start_matches('/'))
}

fn tag_list(base: &str, tags: &[String]) -> Markup {
    html! {
        @if !tags.is_empty() {
            ul.tags {
                @for tag in tags {
                    li { a href=(tag_href(base, tag)) { (tag) } }
                }
            }
        }
    }
}

fn tag_cloud(base: &str, tags: &[TagCount]) -> Markup {
    html! {
        @if !tags.is_empty() {
            ul.tags {
                @for t in tags {
                    li { a href=(tag_href(base, &t.tag)) { (t.tag) " (" (t.count) ")" } }
                }
            }
        }
    }
}

fn post_summary(post: &PostRecord) -> Markup {
    html! {
        li {
            a href={ "/blog/" (post.slug) } { (post.title) }
            @if post.is_draft {
                span.draft-badge { "draft" }
            }
            div.meta {
                time datetime=(post.date) { (post.date_formatted) }
                " · " (post.reading_time) " min read"
            }
            p { (post.excerpt) }
            (tag_list("/blog", &post.tags))
        }
    }
}

fn project_summary(project: &ProjectRecord) -> Markup {
    html! {
        li {
            a href={ "/projects/" (project.slug) } { (project.title) }
            @if project.is_draft {
                span.draft-badge { "draft" }
            }
            @if !project.date_formatted.is_empty() {
                div.meta { time datetime=(project.date) { (project.date_formatted) } }
            }
            p { (project.description) }
            (tag_list("/projects", &project.tags))
        }
    }
}

fn terminal(t: &TerminalRecord) -> Markup {
    html! {
        div.terminal id=(t.id) {
            div.terminal-title { (t.title) }
            ul {
                @for c in &t.commands {
                    li {
                        span.prompt { (c.command) }
                        @if let Some(comment) = &c.comment {
                            " " span.comment { "# " (comment) }
                        }
                    }
                }
            }
        }
    }
}

fn highlights(entry: &TimelineEntry) -> Vec<&str> {
    entry
        .item
        .extra
        .get("highlights")
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default()
}

fn timeline(entries: &[TimelineEntry]) -> Markup {
    html! {
        ol.timeline {
            @for entry in entries {
                li {
                    span class={ "dot " (entry.dot_class) } {}
                    h3 { (entry.display_title) }
                    @if !entry.display_subtitle.is_empty() {
                        div { (entry.display_subtitle) }
                    }
                    div.meta { (entry.display_range) }
                    @let points = highlights(entry);
                    @if !points.is_empty() {
                        ul {
                            @for point in points {
                                li { (point) }
                            }
                        }
                    }
                    @if let Some(link) = entry.item.thesis.as_ref().and_then(|t| t.link.as_deref()) {
                        a href=(link) { "Thesis" }
                    }
                }
            }
        }
    }
}

fn contact_block(context: &Context) -> Markup {
    let contact = &context.contact;
    html! {
        ul.contact {
            li { a href={ "mailto:" (contact.email) } { (contact.email) } }
            @if let Some(location) = &contact.location {
                li { (location) }
            }
            @for (name, url) in &contact.socials {
                li { a href=(url) rel="me noopener" { (name) } }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

pub fn render_home(site_title: &str, home: &HomePage) -> Markup {
    let ctx = home.context;
    let profile = ctx.assets.images.get("profile");

    let content = html! {
        section.hero {
            @if let Some(src) = profile {
                img src=(static_url(src)) alt=(ctx.personal_info.name);
            }
            div {
                h1 { (ctx.personal_info.name) }
                @if let Some(title) = &ctx.personal_info.title {
                    p.meta { (title) }
                }
            }
        }
        section.bio {
            @for paragraph in &ctx.about_me.professional_bio {
                p { (paragraph) }
            }
        }
        @if !home.recent.is_empty() {
            section {
                h2 { "Recent posts" }
                ul.post-list {
                    @for post in home.recent {
                        (post_summary(post))
                    }
                }
            }
        }
        @if !home.featured.is_empty() {
            section {
                h2 { "Projects" }
                ul.project-list {
                    @for project in home.featured {
                        (project_summary(project))
                    }
                }
            }
        }
        @if !ctx.about_me.timeline.is_empty() {
            section {
                h2 { "Experience" }
                (timeline(&ctx.about_me.timeline))
            }
        }
        @if !home.terminals.is_empty() {
            section {
                h2 { "From my shell history" }
                @for t in home.terminals {
                    (terminal(t))
                }
            }
        }
        @if !ctx.hobbies.is_empty() {
            section {
                h2 { "Outside work" }
                ul.hobbies {
                    @for (id, hobby) in &ctx.hobbies {
                        @let label = hobby.extra.get("label").and_then(|v| v.as_str()).unwrap_or(id.as_str());
                        li.hobby style=[hobby.background.as_deref().map(|bg| format!("background-image: url('{}')", static_url(bg)))] {
                            (label)
                        }
                    }
                }
            }
        }
    };

    page(site_title, None, Section::Home, &[], "home-page", content)
}

/// The blog index, or one tag's posts when `tag` is set.
pub fn render_post_list(
    site_title: &str,
    tag: Option<&str>,
    posts: &[PostRecord],
    tags: &[TagCount],
) -> Markup {
    let heading = match tag {
        Some(t) => format!("Posts tagged “{t}”"),
        None => "Blog".to_string(),
    };
    let tag_url = tag.map(|t| tag_href("/blog", t));
    let mut trail = vec![("/blog", "Blog")];
    if let (Some(t), Some(url)) = (tag, tag_url.as_deref()) {
        trail.push((url, t));
    }

    let content = html! {
        h1 { (heading) }
        form.search-form action="/blog/search" method="get" {
            input type="search" name="q" placeholder="Search posts";
            button type="submit" { "Search" }
        }
        (tag_cloud("/blog", tags))
        @if posts.is_empty() {
            p.meta { "No posts yet." }
        } @else {
            ul.post-list {
                @for post in posts {
                    (post_summary(post))
                }
            }
        }
    };

    page(site_title, Some(&heading), Section::Blog, &trail, "blog-page", content)
}

pub fn render_search(site_title: &str, query: &str, results: &[PostRecord]) -> Markup {
    let content = html! {
        h1 { "Search" }
        form.search-form action="/blog/search" method="get" {
            input type="search" name="q" value=(query) placeholder="Search posts";
            button type="submit" { "Search" }
        }
        @if !query.trim().is_empty() {
            p.meta { (results.len()) " result" @if results.len() != 1 { "s" } " for “" (query) "”" }
            ul.post-list {
                @for post in results {
                    (post_summary(post))
                }
            }
        }
    };

    page(
        site_title,
        Some("Search"),
        Section::Blog,
        &[("/blog", "Blog"), ("/blog/search", "Search")],
        "search-page",
        content,
    )
}

pub fn render_post(site_title: &str, post: &PostRecord, related: &[PostRecord]) -> Markup {
    let href = format!("/blog/{}", post.slug);
    let content = html! {
        article {
            h1 { (post.title) }
            div.meta {
                time datetime=(post.date) { (post.date_formatted) }
                " · " (post.author)
                " · " (post.reading_time) " min read"
                @if post.is_draft {
                    span.draft-badge { "draft" }
                }
            }
            (tag_list("/blog", &post.tags))
            @if let Some(image) = &post.featured_image {
                img.featured src=(image) alt=(post.title);
            }
            @if !post.toc.is_empty() {
                nav.toc {
                    ul {
                        @for entry in &post.toc {
                            li class={ "toc-level-" (entry.level) } {
                                a href={ "#" (entry.id) } { (entry.title) }
                            }
                        }
                    }
                }
            }
            (PreEscaped(&post.content_html))
        }
        @if !related.is_empty() {
            section.related {
                h2 { "Related posts" }
                ul.post-list {
                    @for other in related {
                        (post_summary(other))
                    }
                }
            }
        }
    };

    page(
        site_title,
        Some(&post.title),
        Section::Blog,
        &[("/blog", "Blog"), (href.as_str(), post.title.as_str())],
        "post-page",
        content,
    )
}

/// The projects index, or one tag's projects when `tag` is set.
pub fn render_project_list(
    site_title: &str,
    tag: Option<&str>,
    projects: &[ProjectRecord],
    tags: &[TagCount],
) -> Markup {
    let heading = match tag {
        Some(t) => format!("Projects tagged “{t}”"),
        None => "Projects".to_string(),
    };
    let tag_url = tag.map(|t| tag_href("/projects", t));
    let mut trail = vec![("/projects", "Projects")];
    if let (Some(t), Some(url)) = (tag, tag_url.as_deref()) {
        trail.push((url, t));
    }

    let content = html! {
        h1 { (heading) }
        (tag_cloud("/projects", tags))
        @if projects.is_empty() {
            p.meta { "No projects yet." }
        } @else {
            ul.project-list {
                @for project in projects {
                    (project_summary(project))
                }
            }
        }
    };

    page(site_title, Some(&heading), Section::Projects, &trail, "projects-page", content)
}

pub fn render_project(site_title: &str, project: &ProjectRecord) -> Markup {
    let href = format!("/projects/{}", project.slug);
    let content = html! {
        article {
            h1 { (project.title) }
            div.meta {
                @if !project.date_formatted.is_empty() {
                    time datetime=(project.date) { (project.date_formatted) }
                }
                @if project.stars > 0 || project.forks > 0 {
                    " · ★ " (project.stars) " · forks " (project.forks)
                }
                @if project.is_draft {
                    span.draft-badge { "draft" }
                }
            }
            (tag_list("/projects", &project.tags))
            @if !project.technologies.is_empty() {
                p.meta { "Built with " (project.technologies.join(", ")) }
            }
            p {
                @if let Some(url) = &project.github_url {
                    a href=(url) { "Source" }
                }
                @if let Some(url) = &project.demo_url {
                    " " a href=(url) { "Demo" }
                }
            }
            @if let Some(image) = &project.featured_image {
                img.featured src=(image) alt=(project.title);
            }
            (PreEscaped(&project.content_html))
        }
    };

    page(
        site_title,
        Some(&project.title),
        Section::Projects,
        &[("/projects", "Projects"), (href.as_str(), project.title.as_str())],
        "project-page",
        content,
    )
}

/// Timeline, contact details and downloadable files (name → static path).
pub fn render_cv(site_title: &str, context: &Context, files: &BTreeMap<String, String>) -> Markup {
    let content = html! {
        h1 { (context.personal_info.name) }
        @if let Some(title) = &context.personal_info.title {
            p.meta { (title) }
        }
        (contact_block(context))
        @if !files.is_empty() {
            section.files {
                h2 { "Downloads" }
                ul {
                    @for (name, path) in files {
                        li { a href=(static_url(path)) download { (name) } }
                    }
                }
            }
        }
        section {
            h2 { "Experience" }
            (timeline(&context.about_me.timeline))
        }
    };

    page(site_title, Some("CV"), Section::Cv, &[("/cv", "CV")], "cv-page", content)
}

pub fn render_not_found(site_title: &str, path: &str) -> Markup {
    let content = html! {
        h1 { "Not found" }
        @if path.is_empty() {
            p { "Nothing lives here." }
        } @else {
            p { "Nothing lives at " code { (path) } "." }
        }
        p { a href="/" { "Back home" } }
    };
    page(site_title, Some("Not found"), Section::Home, &[], "not-found-page", content)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context;
    use crate::test_helpers::sample_context;
    use crate::types::CommandRecord;

    fn post(slug: &str, title: &str) -> PostRecord {
        PostRecord {
            slug: slug.into(),
            title: title.into(),
            date: "2024-01-30".into(),
            date_formatted: "January 30, 2024".into(),
            year: 2024,
            month: 1,
            content_html: "<p>Body</p>".into(),
            excerpt: "Body".into(),
            tags: vec!["Rust".into()],
            author: "Ada".into(),
            featured_image: None,
            reading_time: 1,
            is_draft: false,
            toc: vec![],
            meta: BTreeMap::new(),
        }
    }

    fn ctx() -> Context {
        context::build(sample_context()).unwrap()
    }

    // =========================================================================
    // Components
    // =========================================================================

    #[test]
    fn base_document_includes_doctype() {
        let doc = base_document("Test", None, html! { p { "content" } });
        let html = doc.into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Test</title>"));
    }

    #[test]
    fn base_document_applies_body_class() {
        let html = base_document("Test", Some("dark"), html! {}).into_string();
        assert!(html.contains(r#"<body class="dark">"#));
    }

    #[test]
    fn nav_marks_current_section() {
        let html = render_nav(Section::Blog).into_string();
        assert!(html.contains(r#"<li class="current"><a href="/blog">Blog</a></li>"#));
        assert!(html.contains(r#"<li><a href="/">Home</a></li>"#));
    }

    #[test]
    fn tag_href_lowercases_and_encodes() {
        assert_eq!(tag_href("/blog", "Rust"), "/blog/tag/rust");
        assert_eq!(tag_href("/blog", "Machine Learning"), "/blog/tag/machine%20learning");
    }

    #[test]
    fn static_url_strips_leading_slash() {
        assert_eq!(static_url("/images/a.png"), "/static/images/a.png");
        assert_eq!(static_url("resume.pdf"), "/static/resume.pdf");
    }

    #[test]
    fn html_escape_in_titles() {
        let html = render_post("Site", &post("x", "<script>alert(1)</script>"), &[]).into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    // =========================================================================
    // Pages
    // =========================================================================

    #[test]
    fn post_page_renders_toc_and_related() {
        let mut p = post("hello", "Hello");
        p.toc = vec![crate::types::TocRecord {
            level: 3,
            id: "setup".into(),
            title: "Setup".into(),
        }];
        let html = render_post("Site", &p, &[post("other", "Other Post")]).into_string();

        assert!(html.contains(r##"<li class="toc-level-3"><a href="#setup">Setup</a></li>"##));
        assert!(html.contains("Related posts"));
        assert!(html.contains(r#"href="/blog/other""#));
        assert!(html.contains("<p>Body</p>"));
        assert!(html.contains("<title>Hello | Site</title>"));
    }

    #[test]
    fn post_list_for_tag_has_heading_and_crumb() {
        let html = render_post_list("Site", Some("rust"), &[post("a", "A")], &[]).into_string();
        assert!(html.contains("Posts tagged “rust”"));
        assert!(html.contains(r#"href="/blog/tag/rust""#));
    }

    #[test]
    fn empty_post_list_says_so() {
        let html = render_post_list("Site", None, &[], &[]).into_string();
        assert!(html.contains("No posts yet."));
    }

    #[test]
    fn search_page_counts_results() {
        let html = render_search("Site", "body", &[post("a", "A")]).into_string();
        assert!(html.contains("1 result for “body”"));
        assert!(html.contains(r#"value="body""#));

        let blank = render_search("Site", "", &[]).into_string();
        assert!(!blank.contains("result"));
    }

    #[test]
    fn home_renders_context_and_terminals() {
        let context = ctx();
        let terminals = vec![TerminalRecord {
            id: "git".into(),
            title: "git".into(),
            commands: vec![CommandRecord {
                command: "git log".into(),
                comment: Some("history".into()),
            }],
        }];
        let home = HomePage {
            context: &context,
            recent: &[post("hello", "Hello")],
            featured: &[],
            terminals: &terminals,
        };
        let html = render_home("Site", &home).into_string();

        assert!(html.contains("<h1>Ada Lovelace</h1>"));
        assert!(html.contains("I build developer tools."));
        assert!(html.contains(r#"src="/static/images/profile.jpeg""#));
        assert!(html.contains(r#"<span class="prompt">git log</span>"#));
        assert!(html.contains("# history"));
        assert!(html.contains(r#"class="dot bg-zinc-100""#));
        assert!(html.contains("Scaled the build farm"));
        assert!(html.contains("background-image: url('/static/images/f1_bg.jpg')"));
        assert!(html.contains("Formula 1"));
    }

    #[test]
    fn cv_lists_files_and_contact() {
        let context = ctx();
        let files = BTreeMap::from([("Resume".to_string(), "resume.pdf".to_string())]);
        let html = render_cv("Site", &context, &files).into_string();

        assert!(html.contains(r#"href="/static/resume.pdf""#));
        assert!(html.contains("mailto:ada@example.com"));
        assert!(html.contains(r#"href="https://github.com/ada""#));
        assert!(html.contains("Staff Engineer"));
        assert!(html.contains("Acme • Platform team"));
        assert!(html.contains("Mar 2021 – Present"));
        assert!(html.contains(r#"href="https://example.com/thesis.pdf""#));
    }

    #[test]
    fn not_found_page_echoes_path() {
        let html = render_not_found("Site", "/nope").into_string();
        assert!(html.contains("<code>/nope</code>"));
    }
}
