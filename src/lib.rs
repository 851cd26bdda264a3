//! # Folio
//!
//! A flat-file personal portfolio: a blog, a projects showcase, a CV and a
//! home page, all read straight from Markdown and JSON in one site directory.
//! There is no database and no build step required to see an edit; the
//! engines notice changed files on the next read.
//!
//! # Architecture: Engines Behind a Route Function
//!
//! ```text
//! posts/*.md ────► PostLoader ────┐
//! projects/*.md ─► ProjectLoader ─┤  CollectionCache (one snapshot each,
//! knowledge.json ► TerminalLoader ┘  refreshed when the FreshnessGate says so)
//!                                          │
//! personal_info.json ─► ContextStore       │  query layer: tags, slugs,
//!       (strict, validated, derived)       │  related, search, featured
//!                     │                    │
//!                     └──────► Site ◄──────┘
//!                               │
//!                       routes::route(path, query) ──► Reply
//!                               │                        │
//!                     serve (tiny_http)        generate (static files)
//! ```
//!
//! Posts, projects and the knowledge base are **best-effort**: a bad file is
//! logged, recorded as a diagnostic and skipped. The context document is
//! **strict**: any schema violation rejects the whole document, and startup
//! fails.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `folio.toml` loading, merging over stock defaults, validation |
//! | [`naming`] | `YYYY-MM-DD-slug` filename convention parser |
//! | [`frontmatter`] | YAML frontmatter splitting and lenient field types |
//! | [`metadata`] | Field resolution chains and date parsing/formatting |
//! | [`markdown`] | Markdown → HTML with heading anchors, TOC, excerpts, reading time |
//! | [`freshness`] | mtime-based staleness check for a directory or single file |
//! | [`loader`] | The `Loader` trait and per-unit parse failures |
//! | [`cache`] | Single-slot snapshot cache with an atomic swap on refresh |
//! | [`query`] | Tag filter, tag counts, related scoring, search |
//! | [`engine`] | A cache plus the query layer, generic over the loader |
//! | [`blog`] | Blog posts |
//! | [`projects`] | Projects and the featured selection |
//! | [`knowledge`] | Terminal snippets from the knowledge base |
//! | [`context`] | The strictly validated personal context and its derived fields |
//! | [`types`] | Serializable records handed to templates and the JSON API |
//! | [`site`] | The service holding every engine |
//! | [`render`] | maud page templates |
//! | [`routes`] | Path → reply, shared by the server and the static build |
//! | [`serve`] | `tiny_http` development server |
//! | [`generate`] | Static build into an output directory |
//! | [`output`] | CLI output formatting for `check` and `build` |
//!
//! # Design Decisions
//!
//! ## No Globals
//!
//! Every engine lives inside one [`site::Site`] built at startup and passed
//! by reference. Tests open as many sites as they like, side by side.
//!
//! ## Full Rescan on Any Change
//!
//! Personal content is small. When any file in a source directory is newer
//! than the snapshot, the whole directory is reparsed and the snapshot is
//! replaced in one swap. Readers holding the old snapshot keep a consistent
//! view; nothing is ever patched in place.
//!
//! ## Explicit Context Reloads
//!
//! The context document is only re-read when a caller asks
//! ([`context::ContextStore::reload_if_changed`]). The server asks once per
//! request; a broken edit keeps the previous context live.

pub mod blog;
pub mod cache;
pub mod config;
pub mod context;
pub mod engine;
pub mod freshness;
pub mod frontmatter;
pub mod generate;
pub mod knowledge;
pub mod loader;
pub mod markdown;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod projects;
pub mod query;
pub mod render;
pub mod routes;
pub mod serve;
pub mod site;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
