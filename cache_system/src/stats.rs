//! Cache statistics tracking

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters, updated without taking the entry lock
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub(crate) fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub(crate) fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    pub(crate) fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }
}

/// Point-in-time view of a cache store, served as-is by `GET /cache/stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Entries physically held, expired-but-unread ones included
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// hits / (hits + misses), 0.0 before the first lookup
    pub hit_rate: f64,
    /// Stored keys, oldest position first
    pub keys: Vec<String>,
}

impl CacheStats {
    pub(crate) fn hit_rate(hits: u64, misses: u64) -> f64 {
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_without_lookups_is_zero() {
        assert_eq!(CacheStats::hit_rate(0, 0), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        assert_eq!(CacheStats::hit_rate(3, 1), 0.75);
        assert_eq!(CacheStats::hit_rate(0, 4), 0.0);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = CacheStats {
            size: 1,
            max_size: 10,
            hits: 2,
            misses: 2,
            evictions: 0,
            expirations: 0,
            hit_rate: 0.5,
            keys: vec!["packages:query:1f".to_string()],
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["maxSize"], 10);
        assert_eq!(json["hitRate"], 0.5);
        assert_eq!(json["keys"][0], "packages:query:1f");
    }
}
