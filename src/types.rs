//! Plain records handed to templates and JSON endpoints.
//!
//! Engine entities never cross the route boundary directly. Each one is
//! converted field by field into a record here, so the wire shape changes
//! only when these structs do.

use crate::blog::BlogPost;
use crate::knowledge::{Command, Terminal};
use crate::markdown::TocEntry;
use crate::projects::{Project, ProjectType};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A blog post as served by `/api/posts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub slug: String,
    pub title: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `January 30, 2024`
    pub date_formatted: String,
    pub year: i32,
    pub month: u32,
    pub content_html: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub reading_time: u32,
    pub is_draft: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub toc: Vec<TocRecord>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocRecord {
    pub level: u8,
    pub id: String,
    pub title: String,
}

impl From<&TocEntry> for TocRecord {
    fn from(entry: &TocEntry) -> Self {
        Self {
            level: entry.level,
            id: entry.id.clone(),
            title: entry.title.clone(),
        }
    }
}

impl From<&BlogPost> for PostRecord {
    fn from(post: &BlogPost) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            date: post.date_iso(),
            date_formatted: post.date_formatted(),
            year: post.year(),
            month: post.month(),
            content_html: post.content_html.clone(),
            excerpt: post.excerpt.clone(),
            tags: post.tags.clone(),
            author: post.author.clone(),
            featured_image: post.featured_image.clone(),
            reading_time: post.reading_time,
            is_draft: post.is_draft,
            toc: post.toc.iter().map(TocRecord::from).collect(),
            meta: post.meta.clone(),
        }
    }
}

/// A project as served by `/api/projects`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRecord {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub content_html: String,
    pub tags: Vec<String>,
    /// `YYYY-MM-DD`, empty when undated.
    pub date: String,
    pub date_formatted: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub featured: bool,
    pub technologies: Vec<String>,
    pub stars: u64,
    pub forks: u64,
    pub is_draft: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl From<&Project> for ProjectRecord {
    fn from(project: &Project) -> Self {
        Self {
            slug: project.slug.clone(),
            title: project.title.clone(),
            description: project.description.clone(),
            content_html: project.content_html.clone(),
            tags: project.tags.clone(),
            date: project.date_iso(),
            date_formatted: project.date_formatted(),
            project_type: project.project_type.clone(),
            github_url: project.github_url.clone(),
            demo_url: project.demo_url.clone(),
            featured_image: project.featured_image.clone(),
            featured: project.featured,
            technologies: project.technologies.clone(),
            stars: project.stars,
            forks: project.forks,
            is_draft: project.is_draft,
            meta: project.meta.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRecord {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl From<&Command> for CommandRecord {
    fn from(command: &Command) -> Self {
        Self {
            command: command.command.clone(),
            comment: command.comment.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalRecord {
    pub id: String,
    pub title: String,
    pub commands: Vec<CommandRecord>,
}

impl From<&Terminal> for TerminalRecord {
    fn from(terminal: &Terminal) -> Self {
        Self {
            id: terminal.id.clone(),
            title: terminal.title.clone(),
            commands: terminal.commands.iter().map(CommandRecord::from).collect(),
        }
    }
}

/// One row of the tag index: lowercased tag and how many entries carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

impl From<(String, usize)> for TagCount {
    fn from((tag, count): (String, usize)) -> Self {
        Self { tag, count }
    }
}

/// Convert a slice of shared entities into records.
pub fn records<T, R>(items: &[Arc<T>]) -> Vec<R>
where
    R: for<'a> From<&'a T>,
{
    items.iter().map(|item| R::from(item.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{find_post, find_project, open_site, setup_site};

    #[test]
    fn post_record_carries_derived_fields() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        let posts = site.blog().get_all(false);
        let record = PostRecord::from(find_post(&posts, "hello-world"));

        assert_eq!(record.date, "2024-01-30");
        assert_eq!(record.date_formatted, "January 30, 2024");
        assert_eq!(record.year, 2024);
        assert_eq!(record.month, 1);
        assert_eq!(record.tags, vec!["Rust", "Web"]);
        assert_eq!(record.toc[0].id, "intro");
    }

    #[test]
    fn post_record_json_shape() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        let posts = site.blog().get_all(false);
        let json = serde_json::to_value(PostRecord::from(find_post(&posts, "async-notes"))).unwrap();

        assert_eq!(json["slug"], "async-notes");
        assert_eq!(json["reading_time"], 1);
        assert!(json.get("featured_image").is_none());
        assert!(json.get("toc").is_none());
    }

    #[test]
    fn project_record_renames_type() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        let projects = site.projects().get_all(false);
        let json = serde_json::to_value(ProjectRecord::from(find_project(&projects, "folio"))).unwrap();

        assert_eq!(json["type"], "github");
        assert_eq!(json["featured"], true);
        assert_eq!(json["technologies"], serde_json::json!(["Rust", "maud"]));
    }

    #[test]
    fn undated_project_record_has_empty_dates() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        let projects = site.projects().get_all(false);
        let record = ProjectRecord::from(find_project(&projects, "dotfiles"));
        // Date comes from the filename prefix.
        assert_eq!(record.date, "2023-05-01");

        let mut undated = find_project(&projects, "dotfiles").clone();
        undated.date = None;
        let record = ProjectRecord::from(&undated);
        assert_eq!(record.date, "");
        assert_eq!(record.date_formatted, "");
    }

    #[test]
    fn terminal_record_skips_missing_comment() {
        let terminal = Terminal {
            id: "git".into(),
            title: "git".into(),
            commands: vec![Command {
                command: "git status".into(),
                comment: None,
            }],
        };
        let json = serde_json::to_value(TerminalRecord::from(&terminal)).unwrap();
        assert_eq!(json["commands"][0], serde_json::json!({"command": "git status"}));
    }

    #[test]
    fn records_converts_in_order() {
        let tmp = setup_site();
        let site = open_site(tmp.path(), false);
        let records: Vec<PostRecord> = records(&site.blog().get_all(false));
        let slugs: Vec<&str> = records.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["async-notes", "hello-world"]);
    }

    #[test]
    fn tag_count_from_pair() {
        let json = serde_json::to_value(TagCount::from(("rust".to_string(), 2))).unwrap();
        assert_eq!(json, serde_json::json!({"tag": "rust", "count": 2}));
    }
}
