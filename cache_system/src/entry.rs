use std::time::Duration;
use tokio::time::Instant;

/// A cached payload together with the time it was stored and how long it stays valid
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub payload: V,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(payload: V, ttl: Duration) -> Self {
        Self {
            payload,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    /// Valid while `now < inserted_at + ttl`
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.inserted_at.checked_add(self.ttl) {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }

    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }
}
