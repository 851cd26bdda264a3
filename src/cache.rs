//! Single-slot collection cache keyed by a freshness stamp.
//!
//! Each content source gets exactly one [`CollectionCache`]. It holds at most
//! one materialized [`Snapshot`]: the fully parsed, sorted collection together
//! with the stamp it was built from.
//!
//! # Read path
//!
//! ```text
//! snapshot()
//!   │
//!   ├─ check the FreshnessGate (mtimes only, no file reads)
//!   │
//!   ├─ Fresh ──────────────► return the stored snapshot          (hit)
//!   │
//!   └─ Stale(stamp) ─► Loader::load() ─► store atomically ─► return (scan)
//! ```
//!
//! A refresh always rescans the whole source; there is no partial reparse.
//! The new snapshot replaces the old one in a single atomic swap, so a reader
//! either sees the complete old collection or the complete new one. Two
//! readers that race on a stale source may both rescan; the results are equal
//! and the last write wins.
//!
//! The snapshot always contains drafts. Draft filtering is a per-call view
//! applied by the query layer.

use crate::freshness::Freshness;
use crate::loader::{Loader, ParseFailure};
use arc_swap::ArcSwapOption;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::debug;

/// One materialized collection.
#[derive(Debug)]
pub struct Snapshot<T> {
    /// Freshness stamp observed just before the scan that built this snapshot.
    pub stamp: SystemTime,
    /// Every parsed entity, drafts included, in collection order.
    pub items: Vec<Arc<T>>,
    /// Units dropped during the scan.
    pub failures: Vec<ParseFailure>,
}

/// Scan and hit counters for one cache.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Full rescans of the source.
    pub scans: u64,
    /// Reads served from the stored snapshot.
    pub hits: u64,
}

impl CacheStats {
    pub fn total(&self) -> u64 {
        self.scans + self.hits
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} scanned, {} cached ({} reads)",
                self.scans,
                self.hits,
                self.total()
            )
        } else {
            write!(f, "{} scanned", self.scans)
        }
    }
}

pub struct CollectionCache<L: Loader> {
    loader: L,
    current: ArcSwapOption<Snapshot<L::Item>>,
    scans: AtomicU64,
    hits: AtomicU64,
}

impl<L: Loader> CollectionCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            current: ArcSwapOption::empty(),
            scans: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Current collection, rescanning first if the source changed.
    pub fn snapshot(&self) -> Arc<Snapshot<L::Item>> {
        let current = self.current.load_full();
        let recorded = current.as_ref().map(|s| s.stamp);

        match (self.loader.gate().check(recorded), current) {
            (Freshness::Fresh, Some(snapshot)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                snapshot
            }
            (Freshness::Stale(stamp), _) => self.refresh(stamp),
            // Unreachable in practice: probing with nothing recorded is always stale.
            (Freshness::Fresh, None) => self.refresh(self.loader.gate().stamp()),
        }
    }

    fn refresh(&self, stamp: SystemTime) -> Arc<Snapshot<L::Item>> {
        let loaded = self.loader.load();
        self.scans.fetch_add(1, Ordering::Relaxed);
        debug!(
            source = %self.loader.gate().path().display(),
            items = loaded.items.len(),
            failures = loaded.failures.len(),
            "collection refreshed"
        );
        let snapshot = Arc::new(Snapshot {
            stamp,
            items: loaded.items.into_iter().map(Arc::new).collect(),
            failures: loaded.failures,
        });
        self.current.store(Some(Arc::clone(&snapshot)));
        snapshot
    }

    /// Drop the stored snapshot so the next read rescans.
    pub fn invalidate(&self) {
        self.current.store(None);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            scans: self.scans.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshness::FreshnessGate;
    use crate::loader::{Loaded, load_directory};
    use crate::test_helpers::set_mtime;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Loads the first line of every `.txt` file.
    struct Lines {
        gate: FreshnessGate,
    }

    impl Lines {
        fn new(dir: &Path) -> Self {
            Self {
                gate: FreshnessGate::directory(dir, "txt"),
            }
        }
    }

    impl Loader for Lines {
        type Item = String;

        fn gate(&self) -> &FreshnessGate {
            &self.gate
        }

        fn load(&self) -> Loaded<String> {
            load_directory(self.gate.path(), "txt", |path| {
                Ok(fs::read_to_string(path)?.lines().next().unwrap_or("").to_string())
            })
        }
    }

    fn contents(snapshot: &Snapshot<String>) -> Vec<String> {
        snapshot.items.iter().map(|s| s.as_str().to_string()).collect()
    }

    // =========================================================================
    // Hits and scans
    // =========================================================================

    #[test]
    fn first_read_scans() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "alpha").unwrap();
        let cache = CollectionCache::new(Lines::new(tmp.path()));

        let snap = cache.snapshot();
        assert_eq!(contents(&snap), vec!["alpha"]);
        assert_eq!(cache.stats(), CacheStats { scans: 1, hits: 0 });
    }

    #[test]
    fn unchanged_source_served_from_cache() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "alpha").unwrap();
        let cache = CollectionCache::new(Lines::new(tmp.path()));

        let first = cache.snapshot();
        let second = cache.snapshot();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { scans: 1, hits: 1 });
    }

    #[test]
    fn modified_file_triggers_full_rescan() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.txt");
        fs::write(&a, "alpha").unwrap();
        fs::write(tmp.path().join("b.txt"), "beta").unwrap();
        let cache = CollectionCache::new(Lines::new(tmp.path()));
        cache.snapshot();

        fs::write(&a, "ALPHA").unwrap();
        set_mtime(&a, SystemTime::now() + Duration::from_secs(120));

        let snap = cache.snapshot();
        assert_eq!(contents(&snap), vec!["ALPHA", "beta"]);
        assert_eq!(cache.stats().scans, 2);
    }

    #[test]
    fn old_snapshot_survives_refresh() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.txt");
        fs::write(&a, "alpha").unwrap();
        let cache = CollectionCache::new(Lines::new(tmp.path()));
        let old = cache.snapshot();

        fs::write(&a, "changed").unwrap();
        set_mtime(&a, SystemTime::now() + Duration::from_secs(120));
        let new = cache.snapshot();

        assert_eq!(contents(&old), vec!["alpha"]);
        assert_eq!(contents(&new), vec!["changed"]);
    }

    #[test]
    fn missing_source_is_empty_and_stays_cached() {
        let tmp = TempDir::new().unwrap();
        let cache = CollectionCache::new(Lines::new(&tmp.path().join("missing")));

        assert!(cache.snapshot().items.is_empty());
        assert!(cache.snapshot().items.is_empty());
        assert_eq!(cache.stats(), CacheStats { scans: 1, hits: 1 });
    }

    #[test]
    fn invalidate_forces_rescan() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "alpha").unwrap();
        let cache = CollectionCache::new(Lines::new(tmp.path()));
        cache.snapshot();
        cache.invalidate();
        cache.snapshot();
        assert_eq!(cache.stats().scans, 2);
    }

    // =========================================================================
    // CacheStats
    // =========================================================================

    #[test]
    fn cache_stats_display_with_hits() {
        let s = CacheStats { scans: 2, hits: 5 };
        assert_eq!(s.to_string(), "2 scanned, 5 cached (7 reads)");
    }

    #[test]
    fn cache_stats_display_no_hits() {
        let s = CacheStats { scans: 1, hits: 0 };
        assert_eq!(s.to_string(), "1 scanned");
    }
}
