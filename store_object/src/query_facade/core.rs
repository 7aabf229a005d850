use crate::errors::QueryError;
use crate::query_builder::{QueryBuilder, QueryOptions, RawQueryOptions, DEFAULT_WINDOW_SIZE};
use crate::traits::backing_store::{BackingStore, Row};
use cache_system::{CacheConfig, CacheError, CacheStore};
use config::{QueryConfig, UnknownOperatorPolicy};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Payload stored in the facade's cache
///
/// Row lists and aggregate records are shared, so a hit hands out the same
/// allocation every time.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedResult {
    Rows(Arc<Vec<Row>>),
    Count(u64),
    Record(Arc<Row>),
}

impl CachedResult {
    pub(crate) fn into_rows(self) -> Option<Arc<Vec<Row>>> {
        match self {
            CachedResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub(crate) fn into_count(self) -> Option<u64> {
        match self {
            CachedResult::Count(total) => Some(total),
            _ => None,
        }
    }

    pub(crate) fn into_record(self) -> Option<Arc<Row>> {
        match self {
            CachedResult::Record(record) => Some(record),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            CachedResult::Rows(_) => "rows",
            CachedResult::Count(_) => "count",
            CachedResult::Record(_) => "record",
        }
    }
}

/// Cached read access to a backing store
pub struct QueryFacade<S: BackingStore> {
    pub(crate) store: S,
    pub(crate) cache: CacheStore<CachedResult>,
    pub(crate) window_size: i64,
    pub(crate) operator_policy: UnknownOperatorPolicy,
}

impl<S: BackingStore> std::fmt::Debug for QueryFacade<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryFacade")
            .field("cache", &self.cache)
            .field("window_size", &self.window_size)
            .field("operator_policy", &self.operator_policy)
            .finish()
    }
}

impl<S: BackingStore> QueryFacade<S> {
    pub fn new(store: S, cache: CacheStore<CachedResult>) -> Self {
        Self {
            store,
            cache,
            window_size: DEFAULT_WINDOW_SIZE,
            operator_policy: UnknownOperatorPolicy::default(),
        }
    }

    /// Build the facade and its cache from the `[cache]` and `[query]` sections
    pub fn from_config(
        store: S,
        cache_config: &CacheConfig,
        query_config: &QueryConfig,
    ) -> Result<Self, CacheError> {
        let cache = CacheStore::from_config(cache_config)?;
        Ok(Self::new(store, cache)
            .with_window_size(query_config.default_window_size)
            .with_operator_policy(query_config.unknown_operator_policy))
    }

    pub fn with_window_size(mut self, window_size: i64) -> Self {
        self.window_size = window_size.max(1);
        self
    }

    pub fn with_operator_policy(mut self, policy: UnknownOperatorPolicy) -> Self {
        self.operator_policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &CacheStore<CachedResult> {
        &self.cache
    }

    pub fn default_ttl(&self) -> Duration {
        self.cache.default_ttl()
    }

    pub fn operator_policy(&self) -> UnknownOperatorPolicy {
        self.operator_policy
    }

    /// Type-check externally supplied options under the configured operator policy
    pub fn resolve_options(&self, raw: RawQueryOptions) -> Result<QueryOptions, QueryError> {
        raw.resolve(self.operator_policy)
    }

    pub(crate) fn builder(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new(table).with_window_size(self.window_size)
    }

    /// Read `key` through the cache, calling `fetch` on a miss.
    ///
    /// Keys are caller-controllable, so an entry of another shape can sit
    /// under `key`; it is replaced by a fresh fetch.
    pub(crate) async fn cached<T, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        wrap: fn(T) -> CachedResult,
        unwrap: fn(CachedResult) -> Option<T>,
        fetch: F,
    ) -> Result<T, QueryError>
    where
        T: Clone,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, QueryError>>,
    {
        cache_system::trace_log!("[CACHE] lookup key={}", key);
        let cached = self
            .cache
            .get_or_try_insert_with(key, ttl, || {
                let pending = fetch();
                async move { pending.await.map(wrap) }
            })
            .await?;

        let kind = cached.kind();
        if let Some(value) = unwrap(cached) {
            return Ok(value);
        }

        tracing::warn!(key, cached = kind, "cached payload has another shape, refetching");
        let fresh = fetch().await?;
        self.cache.insert(key, wrap(fresh.clone()), ttl);
        Ok(fresh)
    }
}
