/// Short-lived display cache for computed assessments.
///
/// ## Why it exists
///
/// The dashboard re-requests the station assessment on every re-render.
/// Recomputing each time makes the displayed values jitter, so the endpoint
/// keeps the last result per key and hands it back while it is younger than
/// the configured time-to-live (10 seconds by default).
///
/// The cache is a plain value owned by the caller. It never reads the clock
/// itself: every call takes `now`, which keeps it deterministic under test.
/// It is a display throttle only; the classifier and estimator never see it.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;

/// Default time-to-live for cached results.
pub const DEFAULT_TTL_SECONDS: i64 = 10;

/// A cached value and when it was computed.
#[derive(Debug, Clone)]
pub struct CachedEntry<V> {
    pub value: V,
    pub computed_at: DateTime<Utc>,
}

/// Keyed TTL cache.
#[derive(Debug, Clone)]
pub struct DisplayCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, CachedEntry<V>>,
}

impl<K: Eq + Hash, V: Clone> DisplayCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECONDS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Entry is fresh while strictly younger than the TTL.
    pub fn is_fresh(&self, key: &K, now: DateTime<Utc>) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| now - entry.computed_at < self.ttl)
    }

    /// The cached value if it is still fresh.
    pub fn get_fresh(&self, key: &K, now: DateTime<Utc>) -> Option<&V> {
        if self.is_fresh(key, now) {
            self.entries.get(key).map(|entry| &entry.value)
        } else {
            None
        }
    }

    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) {
        self.entries.insert(
            key,
            CachedEntry {
                value,
                computed_at: now,
            },
        );
    }

    /// Returns the fresh cached value, or computes, stores and returns a new
    /// one.
    pub fn get_or_insert_with<F>(&mut self, key: K, now: DateTime<Utc>, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get_fresh(&key, now) {
            log::trace!("Display cache hit");
            return value.clone();
        }
        let value = compute();
        self.insert(key, value.clone(), now);
        value
    }

    /// Fallible variant of `get_or_insert_with`. Errors are not cached.
    pub fn try_get_or_insert_with<F, E>(
        &mut self,
        key: K,
        now: DateTime<Utc>,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get_fresh(&key, now) {
            return Ok(value.clone());
        }
        let value = compute()?;
        self.insert(key, value.clone(), now);
        Ok(value)
    }

    /// Drops every entry older than the TTL.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| now - entry.computed_at < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
