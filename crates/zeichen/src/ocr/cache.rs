//! Run-scoped recognition cache.
//!
//! One cache lives for one analysis run and is never persisted. Entries are
//! only ever inserted and read; the first text stored for a fingerprint stays.

use crate::image::ImageFingerprint;
use crate::types::CacheStats;
use ahash::AHashMap;

#[derive(Debug, Default)]
pub struct RecognitionCache {
    entries: AHashMap<ImageFingerprint, String>,
    hits: usize,
    misses: usize,
}

impl RecognitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a fingerprint, counting the hit or miss.
    pub fn lookup(&mut self, fingerprint: &ImageFingerprint) -> Option<String> {
        match self.entries.get(fingerprint) {
            Some(text) => {
                self.hits += 1;
                Some(text.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store recognized text. An existing entry is left untouched.
    pub fn insert(&mut self, fingerprint: ImageFingerprint, text: String) {
        self.entries.entry(fingerprint).or_insert(text);
    }

    pub fn contains(&self, fingerprint: &ImageFingerprint) -> bool {
        self.entries.contains_key(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }

    /// Fold another cache's counters into this one.
    pub(crate) fn absorb_stats(&mut self, other: &RecognitionCache) {
        self.hits += other.hits;
        self.misses += other.misses;
    }
}
