//! In-memory TTL cache shared by request handlers and the refresh job

use crate::cache::CacheKey;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A cached value along with when it was stored and how long it lives
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,

    /// When the value was stored
    pub stored_at: Instant,

    /// How long the value stays fresh
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
            ttl,
        }
    }

    /// Checks if the entry has outlived its TTL
    pub fn is_expired(&self) -> bool {
        self.age() >= self.ttl
    }

    /// Returns how long ago the entry was stored
    pub fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Thread-safe key/value store with per-entry expiry
///
/// Expired entries are dropped lazily on `get` and swept on every `set`.
/// There is no other eviction.
#[derive(Debug)]
pub struct CacheStore<V> {
    entries: Mutex<HashMap<CacheKey, CacheEntry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> CacheStore<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns a clone of the value stored under `key`, if still fresh
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let mut entries = self.lock();

        let value = match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        };

        let counter = if value.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);

        value
    }

    /// Stores `value` under `key`, replacing any previous entry
    pub fn set(&self, key: CacheKey, value: V, ttl: Duration) {
        let mut entries = self.lock();
        entries.retain(|_, entry| !entry.is_expired());
        entries.insert(key, CacheEntry::new(value, ttl));
    }

    /// Removes every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Removes expired entries, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    // Entries are only ever replaced whole, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
