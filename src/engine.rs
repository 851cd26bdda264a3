//! A content engine: one cache plus the query layer on top of it.
//!
//! Every read first lets the cache check its source, so edits on disk show up
//! on the next call without a restart.

use crate::cache::{CacheStats, CollectionCache, Snapshot};
use crate::loader::Loader;
use crate::query::{self, Entry};
use std::sync::Arc;

pub struct ContentEngine<L: Loader> {
    cache: CollectionCache<L>,
}

impl<L> ContentEngine<L>
where
    L: Loader,
    L::Item: Entry,
{
    pub fn new(loader: L) -> Self {
        Self {
            cache: CollectionCache::new(loader),
        }
    }

    /// The full collection, newest first.
    pub fn get_all(&self, include_drafts: bool) -> Vec<Arc<L::Item>> {
        query::visible(&self.cache.snapshot().items, include_drafts)
    }

    /// Lookup by slug, drafts included. Callers decide whether a draft may be shown.
    pub fn get_by_slug(&self, slug: &str) -> Option<Arc<L::Item>> {
        query::find_by_slug(&self.cache.snapshot().items, slug)
    }

    pub fn get_by_tag(&self, tag: &str) -> Vec<Arc<L::Item>> {
        query::filter_by_tag(&self.get_all(false), tag)
    }

    pub fn get_all_tags(&self) -> Vec<(String, usize)> {
        query::tag_counts(&self.get_all(false))
    }

    pub fn get_recent(&self, limit: usize) -> Vec<Arc<L::Item>> {
        let mut items = self.get_all(false);
        items.truncate(limit);
        items
    }

    pub fn get_related(&self, entity: &L::Item, limit: usize) -> Vec<Arc<L::Item>> {
        query::related(&self.get_all(false), entity, limit)
    }

    pub fn search(&self, text: &str) -> Vec<Arc<L::Item>> {
        query::search(&self.get_all(false), text)
    }

    /// The raw snapshot, including parse diagnostics.
    pub fn snapshot(&self) -> Arc<Snapshot<L::Item>> {
        self.cache.snapshot()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn loader(&self) -> &L {
        self.cache.loader()
    }
}
