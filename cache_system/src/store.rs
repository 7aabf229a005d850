//! Bounded in-process cache store
//!
//! Entries expire lazily: an expired entry stays in memory, and counts toward
//! `max_size`, until the next lookup of that exact key (or an explicit
//! `purge_expired`). There is no background sweeper.

use crate::entry::CacheEntry;
use crate::errors::CacheError;
use crate::inflight::InflightGate;
use crate::stats::{CacheCounters, CacheStats};
use config::{CacheConfig, EvictionPolicy};
use lru::LruCache;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::time::Instant;

/// Keyed, TTL-based cache with a fixed capacity
pub struct CacheStore<V> {
    /// Least recently pushed (FIFO) or used (LRU) entry sits at the tail
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    max_size: usize,
    default_ttl: Duration,
    policy: EvictionPolicy,
    counters: CacheCounters,
    inflight: InflightGate,
}

enum Lookup<V> {
    Hit(V),
    Expired,
    Absent,
}

impl<V: Clone> Debug for CacheStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("size", &self.len())
            .field("max_size", &self.max_size)
            .field("default_ttl", &self.default_ttl)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<V: Clone> CacheStore<V> {
    /// Create a new cache store
    pub fn new(
        max_size: usize,
        default_ttl: Duration,
        policy: EvictionPolicy,
    ) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(max_size).ok_or(CacheError::InvalidCapacity(max_size))?;
        if default_ttl.is_zero() {
            return Err(CacheError::InvalidTtl(default_ttl.as_millis()));
        }

        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
            max_size,
            default_ttl,
            policy,
            counters: CacheCounters::default(),
            inflight: InflightGate::default(),
        })
    }

    /// Create a cache store from the `[cache]` configuration section
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        Self::new(config.max_size, config.ttl_duration(), config.eviction_policy)
    }

    /// Look a key up without touching the counters
    fn lookup(&self, key: &str) -> Lookup<V> {
        let mut entries = self.entries.lock();
        let now = Instant::now();

        let expired = match entries.peek(key) {
            None => return Lookup::Absent,
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            entries.pop(key);
            self.counters.record_expiration();
            crate::trace_log!("[CACHE] expired entry removed: {}", key);
            return Lookup::Expired;
        }

        // Only LRU reads refresh an entry's position
        let entry = match self.policy {
            EvictionPolicy::Lru => entries.get(key),
            EvictionPolicy::Fifo => entries.peek(key),
        };
        match entry {
            Some(entry) => Lookup::Hit(entry.payload.clone()),
            None => Lookup::Absent,
        }
    }

    /// Get a payload if present and unexpired; an expired entry is removed
    pub fn get(&self, key: &str) -> Option<V> {
        match self.lookup(key) {
            Lookup::Hit(value) => {
                self.counters.record_hit();
                Some(value)
            }
            Lookup::Expired | Lookup::Absent => {
                self.counters.record_miss();
                None
            }
        }
    }

    /// Store a payload, evicting one entry first if the store is full.
    /// `None` uses the store's default TTL.
    pub fn insert(&self, key: impl Into<String>, payload: V, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut entries = self.entries.lock();

        // An overwrite frees its own slot first, so it never pushes another entry out
        entries.pop(&key);
        if let Some((evicted, _)) = entries.push(key, CacheEntry::new(payload, ttl)) {
            self.counters.record_eviction();
            tracing::debug!("[CACHE] capacity {} reached, evicted {}", self.max_size, evicted);
        }
    }

    /// Remove one entry; returns whether it was present
    pub fn remove(&self, key: &str) -> bool {
        self.entries.lock().pop(key).is_some()
    }

    /// Remove one entry, or every entry when no key is given; returns how many were removed
    pub fn clear(&self, key: Option<&str>) -> usize {
        match key {
            Some(key) => usize::from(self.remove(key)),
            None => {
                let mut entries = self.entries.lock();
                let removed = entries.len();
                entries.clear();
                removed
            }
        }
    }

    /// Remove every entry whose key starts with `prefix`
    pub fn remove_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.lock();
        let doomed: Vec<String> = entries
            .iter()
            .map(|(key, _)| key)
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        for key in &doomed {
            entries.pop(key);
        }
        doomed.len()
    }

    /// Drop every expired entry now instead of waiting for its next lookup
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.pop(key);
            self.counters.record_expiration();
        }
        expired.len()
    }

    /// Return the cached payload, or compute, store and return it.
    ///
    /// Concurrent misses on the same key are serialised: one caller runs `init`
    /// while the others wait and then read its result. A failed `init` stores
    /// nothing, so the next waiter runs its own.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        init: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Lookup::Hit(value) = self.lookup(key) {
            self.counters.record_hit();
            return Ok(value);
        }

        let slot = self.inflight.slot(key);
        let _guard = slot.acquire().await;

        // Someone else may have filled it while we waited
        if let Lookup::Hit(value) = self.lookup(key) {
            self.counters.record_hit();
            return Ok(value);
        }

        self.counters.record_miss();
        let value = init().await?;
        self.insert(key, value.clone(), ttl);
        Ok(value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().contains(key)
    }

    /// Number of entries physically held, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Stored keys, next-to-be-evicted first
    pub fn keys(&self) -> Vec<String> {
        Self::oldest_first(&self.entries.lock())
    }

    fn oldest_first(entries: &LruCache<String, CacheEntry<V>>) -> Vec<String> {
        entries.iter().rev().map(|(key, _)| key.clone()).collect()
    }

    /// Time at which an entry was stored, if present
    pub fn inserted_at(&self, key: &str) -> Option<Instant> {
        self.entries.lock().peek(key).map(|entry| entry.inserted_at)
    }

    pub fn stats(&self) -> CacheStats {
        let (size, keys) = {
            let entries = self.entries.lock();
            (entries.len(), Self::oldest_first(&entries))
        };
        let hits = self.counters.hits();
        let misses = self.counters.misses();

        CacheStats {
            size,
            max_size: self.max_size,
            hits,
            misses,
            evictions: self.counters.evictions(),
            expirations: self.counters.expirations(),
            hit_rate: CacheStats::hit_rate(hits, misses),
            keys,
        }
    }
}
