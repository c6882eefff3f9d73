//! In-memory LRU of encoded preview bytes.
//!
//! Entries are keyed by the xxhash of the full path and bounded both by count
//! and by total bytes. Moves and deletes invalidate the old path explicitly.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};
use xxhash_rust::xxh3::xxh3_64;

/// Environment variable overriding the entry capacity.
pub const PREVIEW_CACHE_ENV: &str = "MEDIASORT_PREVIEW_CACHE";

/// Default capacity for the LRU cache (number of entries).
const DEFAULT_LRU_CAPACITY: usize = 32;

/// Byte budget across all entries.
const MAX_CACHE_BYTES: usize = 256 * 1024 * 1024;

struct Inner {
    entries: LruCache<u64, Arc<[u8]>>,
    current_bytes: usize,
}

pub struct PreviewCache {
    inner: Mutex<Inner>,
    max_bytes: usize,
}

impl PreviewCache {
    pub fn new(capacity: usize, max_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        debug!(capacity, max_bytes, "Initialized preview cache");
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                current_bytes: 0,
            }),
            max_bytes,
        }
    }

    /// Capacity from `$MEDIASORT_PREVIEW_CACHE`, else the default.
    pub fn from_env() -> Self {
        let capacity = std::env::var(PREVIEW_CACHE_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_LRU_CAPACITY);
        Self::new(capacity, MAX_CACHE_BYTES)
    }

    fn key(path: &str) -> u64 {
        xxh3_64(path.as_bytes())
    }

    pub fn get(&self, path: &str) -> Option<Arc<[u8]>> {
        let hit = self.inner.lock().entries.get(&Self::key(path)).cloned();
        if hit.is_some() {
            trace!("Preview cache hit for {}", path);
        }
        hit
    }

    pub fn insert(&self, path: &str, data: Arc<[u8]>) {
        if data.len() > self.max_bytes {
            return;
        }
        let mut inner = self.inner.lock();

        while inner.current_bytes + data.len() > self.max_bytes {
            match inner.entries.pop_lru() {
                Some((_, evicted)) => {
                    inner.current_bytes = inner.current_bytes.saturating_sub(evicted.len());
                }
                None => break,
            }
        }

        let size = data.len();
        // `push` also reports the entry evicted for capacity.
        if let Some((_, old)) = inner.entries.push(Self::key(path), data) {
            inner.current_bytes = inner.current_bytes.saturating_sub(old.len());
        }
        inner.current_bytes += size;
    }

    pub fn remove(&self, path: &str) -> bool {
        let mut inner = self.inner.lock();
        match inner.entries.pop(&Self::key(path)) {
            Some(old) => {
                inner.current_bytes = inner.current_bytes.saturating_sub(old.len());
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    #[cfg(test)]
    pub fn memory_usage(&self) -> usize {
        self.inner.lock().current_bytes
    }
}
