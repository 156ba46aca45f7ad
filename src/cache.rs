// Response cache for read queries

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.stored_at.elapsed() < self.ttl
    }
}

/// Thread-safe cache of server responses keyed by query name
#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<DashMap<String, CacheEntry>>,

    /// TTL for entries inserted without an explicit one
    default_ttl: Duration,
}

impl QueryCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            default_ttl,
        }
    }

    /// Cached value for `key`, if still fresh.
    /// Stale entries are evicted on access.
    pub fn get(&self, key: &str) -> Option<Value> {
        let fresh = self.entries.get(key).and_then(|entry| {
            if entry.is_fresh() {
                Some(entry.value.clone())
            } else {
                None
            }
        });

        if fresh.is_none() {
            self.entries.remove_if(key, |_, entry| !entry.is_fresh());
        }
        fresh
    }

    pub fn insert(&self, key: &str, value: Value) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    pub fn insert_with_ttl(&self, key: &str, value: Value, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Drop every entry whose key starts with `prefix`
    pub fn invalidate(&self, prefix: &str) {
        self.entries.retain(|key, _| !key.starts_with(prefix));
        tracing::debug!(prefix = %prefix, "Invalidated cached queries");
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
