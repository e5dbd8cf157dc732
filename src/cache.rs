//! Route resolution caching
//!
//! Memoizes path → [`Resolution`] lookups with LRU eviction. Misses are cached
//! too, so repeated navigation to an unknown path skips the table scan. The
//! cache must be cleared whenever the route table changes;
//! [`RouteRegistry`](crate::RouteRegistry) does this on every registration.

use crate::route::Resolution;
use crate::trace_log;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache performance statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub invalidations: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of resolutions keyed by normalized path.
#[derive(Debug)]
pub struct ResolutionCache {
    entries: LruCache<String, Option<Resolution>>,
    stats: CacheStats,
}

impl ResolutionCache {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Capacity is clamped to at least one entry.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Look up a path. The outer `Option` is the cache hit, the inner one the
    /// cached resolution (`None` for a cached miss).
    pub fn get(&mut self, path: &str) -> Option<Option<Resolution>> {
        if let Some(entry) = self.entries.get(path) {
            self.stats.hits += 1;
            trace_log!("Resolution cache hit for '{}'", path);
            Some(entry.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("Resolution cache miss for '{}'", path);
            None
        }
    }

    pub fn insert(&mut self, path: String, resolution: Option<Resolution>) {
        self.entries.push(path, resolution);
    }

    pub fn clear(&mut self) {
        trace_log!("Clearing resolution cache");
        self.entries.clear();
        self.stats.invalidations += 1;
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}
