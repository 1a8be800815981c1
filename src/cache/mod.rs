//! Embed source cache
//!
//! A concurrent key/value store where every entry carries an absolute
//! expiry instant. Expired entries are dropped lazily: the first `get` that
//! sees one removes it. There is no background sweep and no capacity bound.

pub mod clock;

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use clock::{Clock, SystemClock};

/// Cache entry with its expiry
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    /// `None` when `now + ttl` does not fit in an `Instant`
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: now.checked_add(ttl),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires_at) => now > expires_at,
            None => false,
        }
    }
}

/// TTL cache keyed by string
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache driven by the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a cache driven by the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Look up a live value, removing the entry if it has expired
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();

        // The read guard must be released before removing from the same shard.
        match self.entries.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => {}
        }

        self.remove_expired(key, now);
        None
    }

    /// Remove `key` only if it is still expired as of `now`. The check runs
    /// under the shard write lock, so an entry refreshed since `now` was read
    /// is kept.
    fn remove_expired(&self, key: &str, now: Instant) -> bool {
        self.entries
            .remove_if(key, |_, entry| entry.is_expired(now))
            .is_some()
    }

    /// Insert or overwrite the value for `key`, valid for `ttl` from now
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry::new(value, self.clock.now(), ttl);
        self.entries.insert(key.into(), entry);
    }

    /// Whether the map holds an entry for `key`, live or not yet collected
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries in the map, including expired ones not yet collected
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of live and expired entry counts. Does not remove anything.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let mut stats = CacheStats::default();

        for entry in self.entries.iter() {
            stats.entry_count += 1;
            if entry.value().is_expired(now) {
                stats.expired_count += 1;
            } else {
                stats.live_count += 1;
            }
        }

        stats
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entry_count: usize,
    pub live_count: usize,
    pub expired_count: usize,
}
