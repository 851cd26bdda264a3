//! Terminal snippets shown on the home page.
//!
//! The knowledge base is one JSON document:
//!
//! ```json
//! { "terminals": [
//!     { "id": "git", "title": "git",
//!       "commands": [ { "command": "git log --oneline", "comment": "short history" } ] }
//! ] }
//! ```
//!
//! Each terminal entry is decoded on its own, so one malformed entry drops
//! only itself. A missing, unreadable or non-JSON file yields no terminals
//! and a logged warning.

use crate::cache::{CacheStats, CollectionCache, Snapshot};
use crate::freshness::FreshnessGate;
use crate::loader::{Loaded, Loader, ParseError, ParseFailure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terminal {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub commands: Vec<Command>,
}

fn default_title() -> String {
    "terminal".to_string()
}

#[derive(Debug, Default, Deserialize)]
struct Document {
    #[serde(default)]
    terminals: Vec<serde_json::Value>,
}

/// Loads the knowledge-base document.
pub struct TerminalLoader {
    gate: FreshnessGate,
}

impl TerminalLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            gate: FreshnessGate::file(path),
        }
    }

    fn read_document(&self) -> Result<Document, ParseError> {
        let text = fs::read_to_string(self.gate.path())?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Loader for TerminalLoader {
    type Item = Terminal;

    fn gate(&self) -> &FreshnessGate {
        &self.gate
    }

    fn load(&self) -> Loaded<Terminal> {
        let path = self.gate.path().to_path_buf();
        let mut loaded = Loaded::default();
        if !self.gate.exists() {
            warn!(path = %path.display(), "knowledge base missing, no terminals");
            return loaded;
        }

        let document = match self.read_document() {
            Ok(document) => document,
            Err(error) => {
                warn!(path = %path.display(), %error, "knowledge base unreadable, no terminals");
                loaded.failures.push(ParseFailure { path, error });
                return loaded;
            }
        };

        for (index, raw) in document.terminals.into_iter().enumerate() {
            match serde_json::from_value::<Terminal>(raw) {
                Ok(terminal) => loaded.items.push(terminal),
                Err(error) => {
                    warn!(path = %path.display(), index, %error, "skipping malformed terminal");
                    loaded.failures.push(ParseFailure {
                        path: path.clone(),
                        error: error.into(),
                    });
                }
            }
        }
        loaded
    }
}

/// Cached access to the terminals, in file order.
pub struct KnowledgeBase {
    cache: CollectionCache<TerminalLoader>,
}

impl KnowledgeBase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            cache: CollectionCache::new(TerminalLoader::new(path)),
        }
    }

    pub fn terminals(&self) -> Vec<Arc<Terminal>> {
        self.cache.snapshot().items.clone()
    }

    pub fn terminal_by_id(&self, id: &str) -> Option<Arc<Terminal>> {
        self.cache
            .snapshot()
            .items
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub fn snapshot(&self) -> Arc<Snapshot<Terminal>> {
        self.cache.snapshot()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{set_mtime, write_file};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    const DOC: &str = r#"{
        "terminals": [
            { "id": "git", "title": "git",
              "commands": [ { "command": "git status", "comment": "what changed" },
                            { "command": "git log" } ] },
            { "id": "docker" }
        ]
    }"#;

    #[test]
    fn loads_terminals_in_file_order() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "kb.json", DOC);
        let kb = KnowledgeBase::new(path);

        let terminals = kb.terminals();
        assert_eq!(terminals.len(), 2);
        assert_eq!(terminals[0].id, "git");
        assert_eq!(terminals[0].commands.len(), 2);
        assert_eq!(terminals[0].commands[0].comment.as_deref(), Some("what changed"));
        assert_eq!(terminals[0].commands[1].comment, None);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "kb.json", r#"{"terminals": [{"commands": [{}]}]}"#);
        let kb = KnowledgeBase::new(path);

        let t = &kb.terminals()[0];
        assert_eq!(t.id, "");
        assert_eq!(t.title, "terminal");
        assert_eq!(t.commands[0].command, "");
    }

    #[test]
    fn terminal_by_id() {
        let tmp = TempDir::new().unwrap();
        let kb = KnowledgeBase::new(write_file(tmp.path(), "kb.json", DOC));
        assert_eq!(kb.terminal_by_id("docker").unwrap().title, "terminal");
        assert!(kb.terminal_by_id("npm").is_none());
    }

    #[test]
    fn malformed_entry_dropped_alone() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            tmp.path(),
            "kb.json",
            r#"{"terminals": [{"id": "ok"}, {"id": 7}, "nonsense"]}"#,
        );
        let kb = KnowledgeBase::new(path);
        let ids: Vec<String> = kb.terminals().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec!["ok"]);
        assert_eq!(kb.snapshot().failures.len(), 2);
    }

    #[test]
    fn missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let kb = KnowledgeBase::new(tmp.path().join("kb.json"));
        assert!(kb.terminals().is_empty());
        assert!(kb.snapshot().failures.is_empty());
    }

    #[test]
    fn invalid_json_is_empty_with_diagnostic() {
        let tmp = TempDir::new().unwrap();
        let kb = KnowledgeBase::new(write_file(tmp.path(), "kb.json", "{ not json"));
        assert!(kb.terminals().is_empty());
        assert!(matches!(
            kb.snapshot().failures[0].error,
            ParseError::Json(_)
        ));
    }

    #[test]
    fn reloads_when_file_changes() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "kb.json", DOC);
        let kb = KnowledgeBase::new(&path);
        assert_eq!(kb.terminals().len(), 2);
        assert_eq!(kb.terminals().len(), 2);
        assert_eq!(kb.stats().scans, 1);

        fs::write(&path, r#"{"terminals": []}"#).unwrap();
        set_mtime(&path, SystemTime::now() + Duration::from_secs(120));
        assert!(kb.terminals().is_empty());
        assert_eq!(kb.stats().scans, 2);
    }
}
