//! Read-only queries over a collection.
//!
//! Every function here is pure: it takes the entities of one snapshot (in
//! collection order, newest first) and returns a new view. Nothing touches
//! the filesystem; the engine refreshes the snapshot before calling in.
//!
//! Tag comparisons are case-insensitive everywhere. Tags keep their original
//! case for display, but `Go`, `go` and `GO` are the same tag for filtering,
//! counting and relatedness.

use std::collections::HashMap;
use std::sync::Arc;

/// The fields queries look at.
pub trait Entry {
    fn slug(&self) -> &str;
    fn title(&self) -> &str;
    fn tags(&self) -> &[String];
    fn is_draft(&self) -> bool;
    /// Raw source text, searched by [`search`].
    fn body(&self) -> &str;

    fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.to_lowercase();
        self.tags().iter().any(|t| t.to_lowercase() == wanted)
    }
}

/// Entities to show, drafts dropped unless asked for.
pub fn visible<T: Entry>(items: &[Arc<T>], include_drafts: bool) -> Vec<Arc<T>> {
    items
        .iter()
        .filter(|e| include_drafts || !e.is_draft())
        .cloned()
        .collect()
}

/// First entity with this slug, drafts included.
///
/// Duplicate slugs are not rejected at load time; the first one in collection
/// order shadows the rest.
pub fn find_by_slug<T: Entry>(items: &[Arc<T>], slug: &str) -> Option<Arc<T>> {
    items.iter().find(|e| e.slug() == slug).cloned()
}

pub fn filter_by_tag<T: Entry>(items: &[Arc<T>], tag: &str) -> Vec<Arc<T>> {
    items.iter().filter(|e| e.has_tag(tag)).cloned().collect()
}

/// Lowercased tag → occurrence count, most used first.
///
/// Ties keep the order in which each tag was first seen while walking the
/// collection, so the result is deterministic for a given snapshot.
pub fn tag_counts<T: Entry>(items: &[Arc<T>]) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for tag in items.iter().flat_map(|e| e.tags()) {
        let key = tag.to_lowercase();
        match index.get(&key) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, 1));
            }
        }
    }
    // Stable: equal counts stay in first-seen order.
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

/// Entities sharing tags with `reference`, best match first.
///
/// Score is the number of shared tags (case-insensitive). Zero-score entities
/// and the reference itself (matched by slug) are left out. Equal scores keep
/// collection order.
pub fn related<T: Entry>(items: &[Arc<T>], reference: &T, limit: usize) -> Vec<Arc<T>> {
    let wanted: Vec<String> = reference.tags().iter().map(|t| t.to_lowercase()).collect();
    let mut scored: Vec<(usize, &Arc<T>)> = items
        .iter()
        .filter(|e| e.slug() != reference.slug())
        .map(|e| {
            let mut own: Vec<String> = e.tags().iter().map(|t| t.to_lowercase()).collect();
            own.sort();
            own.dedup();
            let score = own.iter().filter(|t| wanted.contains(t)).count();
            (score, e)
        })
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, e)| Arc::clone(e))
        .collect()
}

/// Case-insensitive substring match on title, raw body or any tag.
///
/// The query is used as written: an empty query matches everything.
pub fn search<T: Entry>(items: &[Arc<T>], query: &str) -> Vec<Arc<T>> {
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|e| {
            e.title().to_lowercase().contains(&needle)
                || e.body().to_lowercase().contains(&needle)
                || e.tags().iter().any(|t| t.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}
