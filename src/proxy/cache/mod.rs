use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::trace;

mod index;

use index::{CacheEntry, CacheIndex};

/// Outcome of a cache probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Payload copied into the caller's buffer; carries its length.
    Hit(usize),
    Miss,
    /// The entry exists but the caller's buffer cannot hold it.
    BufferTooSmall,
}

/// Outcome of an admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Inserted,
    /// Payload exceeds the per-object budget; the cache is untouched.
    Rejected,
}

/// Shared response cache: an LRU index of immutable payloads behind a
/// reader/writer lock. Lookups copy into caller-owned buffers, so entry
/// payloads never leave the cache, and no lock is ever held across I/O.
#[derive(Debug)]
pub struct ObjectCache {
    index: RwLock<CacheIndex>,
    max_object_bytes: usize,
    next_id: AtomicU64,
}

impl ObjectCache {
    pub fn new(max_bytes: usize, max_object_bytes: usize) -> Self {
        Self {
            index: RwLock::new(CacheIndex::new(max_bytes)),
            max_object_bytes,
            next_id: AtomicU64::new(1),
        }
    }

    /// Probes `key`, copying the payload into `out` on a hit. The recency
    /// bump is a mutation, so the lock is re-acquired as a writer for it;
    /// the promotion is skipped if the entry was replaced in between.
    pub fn lookup(&self, key: &str, out: &mut [u8]) -> Lookup {
        let (id, size) = {
            let guard = self.index.read();
            let Some(entry) = guard.peek(key) else {
                return Lookup::Miss;
            };
            if out.len() < entry.size() {
                return Lookup::BufferTooSmall;
            }
            out[..entry.size()].copy_from_slice(&entry.payload);
            (entry.id, entry.size())
        };

        self.index.write().promote_if_id_matches(key, id);
        Lookup::Hit(size)
    }

    /// Admits `payload` under `key`, evicting least-recently-used entries
    /// until the byte budget fits. A same-key entry is replaced, not
    /// duplicated.
    pub fn insert(&self, key: &str, payload: &[u8]) -> Admission {
        if payload.len() > self.max_object_bytes {
            return Admission::Rejected;
        }

        let entry = CacheEntry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            payload: Arc::from(payload),
        };
        let evicted = self.index.write().insert(key.to_string(), entry);
        if evicted > 0 {
            trace!(key, evicted, "evicted entries to admit new payload");
        }
        Admission::Inserted
    }

    /// Evicts everything. Called once at shutdown.
    pub fn clear(&self) {
        self.index.write().clear();
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bytes_in_use(&self) -> usize {
        self.index.read().bytes_in_use()
    }

    #[cfg(test)]
    fn keys_mru_first(&self) -> Vec<String> {
        self.index.read().keys_mru_first()
    }
}
