use crate::results::ExtractionResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Counters and sizes describing a [`ResultCache`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of cached URLs
    pub key_count: usize,
    /// Sum of the byte lengths of every cached URL
    pub key_size: usize,
    /// Sum of the serialized JSON lengths of every cached result
    pub value_size: usize,
}

/// URL keyed store of extraction results with hit and miss counters
///
/// Keys are the request strings exactly as given; no normalization happens,
/// so `https://a.com` and `https://a.com/` are distinct entries. Entries never
/// expire and are only dropped by [`ResultCache::clear`].
#[derive(Debug, Default)]
pub struct ResultCache {
    store: HashMap<String, ExtractionResult>,
    hits: u64,
    misses: u64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `url`, counting a hit or a miss
    pub fn get(&mut self, url: &str) -> Option<&ExtractionResult> {
        match self.store.get(url) {
            Some(result) => {
                self.hits += 1;
                ::log::debug!("Cache hit for {}", url);
                Some(result)
            }
            None => {
                self.misses += 1;
                ::log::debug!("Cache miss for {}", url);
                None
            }
        }
    }

    /// Stores `result` under `url`, replacing any previous entry
    pub fn set(&mut self, url: impl Into<String>, result: ExtractionResult) {
        let url = url.into();
        ::log::debug!("Caching result for {}", url);
        self.store.insert(url, result);
    }

    /// Snapshot of the cached URLs in no particular order
    pub fn keys(&self) -> Vec<String> {
        self.store.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Empties the store and resets both counters
    pub fn clear(&mut self) {
        ::log::info!("Clearing cache with {} entries", self.store.len());
        self.store.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Current statistics
    ///
    /// `value_size` serializes every stored result on each call.
    pub fn stats(&self) -> CacheStats {
        let value_size = self
            .store
            .values()
            .map(|result| serde_json::to_string(result).map_or(0, |json| json.len()))
            .sum();

        CacheStats {
            hits: self.hits,
            misses: self.misses,
            key_count: self.store.len(),
            key_size: self.store.keys().map(String::len).sum(),
            value_size,
        }
    }
}
