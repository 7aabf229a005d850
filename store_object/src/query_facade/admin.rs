use super::core::QueryFacade;
use crate::traits::backing_store::BackingStore;
use cache_system::CacheStats;

impl<S: BackingStore> QueryFacade<S> {
    /// Remove one entry, or every entry when `key` is `None`.
    /// Returns how many entries were removed.
    pub fn clear_cache(&self, key: Option<&str>) -> usize {
        let cleared = self.cache.clear(key);
        match key {
            Some(key) => tracing::info!(key, cleared, "cache entry cleared"),
            None => tracing::info!(cleared, "cache cleared"),
        }
        cleared
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every derived key for `table`: row lists, counts and aggregates.
    /// Entries stored under caller-supplied keys are left alone.
    pub fn invalidate_table(&self, table: &str) -> usize {
        let removed = self.cache.remove_prefix(&format!("{}:", table))
            + self.cache.remove_prefix(&format!("{}_agg:", table));
        tracing::info!(table, removed, "table cache invalidated");
        removed
    }

    /// Remove expired entries now instead of on their next read
    pub fn purge_expired(&self) -> usize {
        let purged = self.cache.purge_expired();
        tracing::info!(purged, "expired cache entries purged");
        purged
    }
}
