use std::sync::Arc;

use lru::LruCache;

/// A cached payload plus the identity used to validate recency promotions.
#[derive(Debug, Clone)]
pub(super) struct CacheEntry {
    pub id: u64,
    pub payload: Arc<[u8]>,
}

impl CacheEntry {
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

/// Recency-ordered index with byte accounting. Not synchronized; the caller
/// holds the lock.
#[derive(Debug)]
pub(super) struct CacheIndex {
    lru: LruCache<String, CacheEntry>,
    bytes_in_use: usize,
    max_bytes: usize,
}

impl CacheIndex {
    pub(super) fn new(max_bytes: usize) -> Self {
        Self {
            lru: LruCache::unbounded(),
            bytes_in_use: 0,
            max_bytes,
        }
    }

    pub(super) fn clear(&mut self) {
        self.bytes_in_use = 0;
        self.lru.clear();
    }

    pub(super) fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.lru.peek(key)
    }

    /// Moves `key` to the head of the recency list, but only while the entry
    /// is still the one the caller saw; a replacement keeps its own position.
    pub(super) fn promote_if_id_matches(&mut self, key: &str, id: u64) -> bool {
        let current = self.lru.peek(key).map(|entry| entry.id);
        if current == Some(id) {
            self.lru.promote(key);
            true
        } else {
            false
        }
    }

    /// Installs `entry` at the head, replacing any same-key entry first and
    /// evicting from the tail until the byte budget fits. The new entry is
    /// only pushed afterwards, so it can never be its own eviction victim.
    /// Returns the number of entries evicted.
    pub(super) fn insert(&mut self, key: String, entry: CacheEntry) -> usize {
        if let Some(previous) = self.lru.pop(&key) {
            self.bytes_in_use = self.bytes_in_use.saturating_sub(previous.size());
        }

        let mut evicted = 0usize;
        while self.bytes_in_use + entry.size() > self.max_bytes {
            match self.lru.pop_lru() {
                Some((_key, removed)) => {
                    self.bytes_in_use = self.bytes_in_use.saturating_sub(removed.size());
                    evicted += 1;
                }
                None => break,
            }
        }

        self.bytes_in_use = self.bytes_in_use.saturating_add(entry.size());
        self.lru.push(key, entry);
        evicted
    }

    pub(super) fn bytes_in_use(&self) -> usize {
        self.bytes_in_use
    }

    pub(super) fn len(&self) -> usize {
        self.lru.len()
    }

    #[cfg(test)]
    pub(super) fn keys_mru_first(&self) -> Vec<String> {
        self.lru.iter().map(|(key, _)| key.clone()).collect()
    }
}
