//! Result cache
//!
//! Bounded, content-hash-keyed LRU caches for whole-document derived
//! artifacts. Only the small-document paths consult it: a whole-buffer cache
//! key for a huge document changes on almost every keystroke and would
//! thrash. Each artifact category has its own capacity; puts replace entries
//! wholesale, stored artifacts are never mutated.

use crate::config::CacheConfig;
use crate::fingerprint::ContentHash;
use crate::outline::OutlineEntry;
use crate::status::StatusCounters;
use crate::tokenizer::StyleSpan;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Style spans for every line of a document, index 0 = line 1
pub type DocumentStyling = Vec<Vec<StyleSpan>>;

pub struct ResultCache {
    styling: LruCache<ContentHash, Arc<DocumentStyling>>,
    outlines: LruCache<ContentHash, Arc<Vec<OutlineEntry>>>,
    counters: LruCache<ContentHash, StatusCounters>,
}

impl ResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            styling: LruCache::new(capacity(config.styling_entries)),
            outlines: LruCache::new(capacity(config.outline_entries)),
            counters: LruCache::new(capacity(config.counter_entries)),
        }
    }

    pub fn get_styling(&mut self, hash: ContentHash) -> Option<Arc<DocumentStyling>> {
        self.styling.get(&hash).cloned()
    }

    pub fn put_styling(&mut self, hash: ContentHash, styling: Arc<DocumentStyling>) {
        self.styling.put(hash, styling);
    }

    pub fn get_outline(&mut self, hash: ContentHash) -> Option<Arc<Vec<OutlineEntry>>> {
        self.outlines.get(&hash).cloned()
    }

    pub fn put_outline(&mut self, hash: ContentHash, outline: Arc<Vec<OutlineEntry>>) {
        self.outlines.put(hash, outline);
    }

    pub fn get_counters(&mut self, hash: ContentHash) -> Option<StatusCounters> {
        self.counters.get(&hash).cloned()
    }

    pub fn put_counters(&mut self, hash: ContentHash, counters: StatusCounters) {
        self.counters.put(hash, counters);
    }

    /// Drop every cached artifact (administrative reset)
    pub fn clear(&mut self) {
        self.styling.clear();
        self.outlines.clear();
        self.counters.clear();
    }
}

fn capacity(entries: usize) -> NonZeroUsize {
    NonZeroUsize::new(entries.max(1)).expect("max(1) is non-zero")
}
