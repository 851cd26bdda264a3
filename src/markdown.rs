//! Markdown rendering and text-derived fields.
//!
//! Rendering uses pulldown-cmark with tables, footnotes, strikethrough and
//! smart punctuation enabled. Soft line breaks become `<br />`, so a newline
//! inside a paragraph shows up as a newline on the page.
//!
//! ## Heading anchors
//!
//! With [`Anchors::Permalinks`], every heading gets an `id` derived from its
//! text and a trailing `¶` permalink. Ids are unique within one document
//! (`setup`, `setup-1`, ...). The id registry is local to a single
//! [`render`] call, so numbering can never leak from one file into the next.
//! Headings of level 2 to 4 are also collected into a table of contents.

use crate::naming::slugify;
use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use serde::Serialize;
use std::collections::HashMap;

/// Whether headings get generated ids and permalinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchors {
    None,
    Permalinks,
}

/// One table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub level: u8,
    pub id: String,
    pub title: String,
}

/// Rendered HTML plus the table of contents collected along the way.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Render a Markdown body to HTML.
pub fn render(source: &str, anchors: Anchors) -> Rendered {
    let parser = Parser::new_ext(source, options()).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    match anchors {
        Anchors::None => {
            html::push_html(&mut out, parser);
            Rendered {
                html: out,
                toc: Vec::new(),
            }
        }
        Anchors::Permalinks => {
            let mut state = AnchorState::default();
            let events = state.rewrite(parser);
            html::push_html(&mut out, events.into_iter());
            Rendered {
                html: out,
                toc: state.toc,
            }
        }
    }
}

/// Per-document anchor bookkeeping.
#[derive(Default)]
struct AnchorState {
    seen: HashMap<String, usize>,
    toc: Vec<TocEntry>,
}

impl AnchorState {
    fn rewrite<'a>(&mut self, events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::new();
        let mut heading: Option<(HeadingLevel, Option<CowStr<'a>>, Vec<Event<'a>>)> = None;

        for event in events {
            match event {
                Event::Start(Tag::Heading { level, id, .. }) if heading.is_none() => {
                    heading = Some((level, id, Vec::new()));
                }
                Event::End(TagEnd::Heading(_)) if heading.is_some() => {
                    if let Some((level, explicit_id, inner)) = heading.take() {
                        self.emit_heading(level, explicit_id, inner, &mut out);
                    }
                }
                other => match heading.as_mut() {
                    Some((_, _, inner)) => inner.push(other),
                    None => out.push(other),
                },
            }
        }
        out
    }

    fn emit_heading<'a>(
        &mut self,
        level: HeadingLevel,
        explicit_id: Option<CowStr<'a>>,
        inner: Vec<Event<'a>>,
        out: &mut Vec<Event<'a>>,
    ) {
        let text: String = inner
            .iter()
            .filter_map(|e| match e {
                Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
                _ => None,
            })
            .collect();

        let base = explicit_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| slugify(&text));
        let base = if base.is_empty() {
            "section".to_string()
        } else {
            base
        };
        let id = self.unique(base);

        let depth = level as u8;
        if (2..=4).contains(&depth) {
            self.toc.push(TocEntry {
                level: depth,
                id: id.clone(),
                title: text.trim().to_string(),
            });
        }

        out.push(Event::Html(format!("<{level} id=\"{id}\">").into()));
        out.extend(inner);
        out.push(Event::Html(
            format!(
                "<a class=\"header-link\" href=\"#{id}\" title=\"Permanent link\">&para;</a></{level}>\n"
            )
            .into(),
        ));
    }

    fn unique(&mut self, base: String) -> String {
        let count = self.seen.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base.clone()
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        id
    }
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
pub fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Compute an excerpt from rendered HTML.
///
/// Tags are stripped and whitespace collapsed. Text longer than `max_chars`
/// is cut back to the last word boundary inside the budget and `...` is
/// appended.
pub fn excerpt(html: &str, max_chars: usize) -> String {
    let text = strip_html_tags(html)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if text.chars().count() <= max_chars {
        return text;
    }

    let cut = text
        .char_indices()
        .nth(max_chars)
        .map_or(text.len(), |(i, _)| i);
    let head = &text[..cut];
    let head = match head.rfind(' ') {
        Some(pos) => &head[..pos],
        None => head,
    };
    format!("{head}...")
}

/// Estimated reading time in whole minutes, never less than one.
pub fn reading_time(text: &str, words_per_minute: usize) -> u32 {
    let words = text.split_whitespace().count();
    let minutes = (words as f64 / words_per_minute.max(1) as f64).round_ties_even();
    (minutes as u32).max(1)
}
