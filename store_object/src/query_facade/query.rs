use super::core::{CachedResult, QueryFacade};
use crate::errors::QueryError;
use crate::query_builder::{
    compose_join_projection, AggregationRequest, JoinSpec, PaginatedResult, PaginationRequest,
    QueryOptions,
};
use crate::traits::backing_store::{BackingStore, Row};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

impl<S: BackingStore> QueryFacade<S> {
    /// Rows of `table` matching `options`.
    ///
    /// Without `cache_key` the key is derived from the table and a canonical
    /// encoding of `options`. `ttl` defaults to the cache's default TTL.
    /// Store errors are returned as they are and never cached.
    pub async fn execute_query(
        &self,
        table: &str,
        options: &QueryOptions,
        cache_key: Option<&str>,
        ttl: Option<Duration>,
    ) -> Result<Arc<Vec<Row>>, QueryError> {
        let key = match cache_key {
            Some(key) => key.to_string(),
            None => options.cache_key(table),
        };

        self.cached(
            &key,
            ttl,
            CachedResult::Rows,
            CachedResult::into_rows,
            || self.fetch_rows(table, options),
        )
        .await
    }

    async fn fetch_rows(&self, table: &str, options: &QueryOptions) -> Result<Arc<Vec<Row>>, QueryError> {
        let request = self.builder(table).build(options);
        let started = Instant::now();

        match self.store.select(&request).await {
            Ok(rows) => {
                tracing::debug!(
                    table,
                    rows = rows.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "query executed"
                );
                Ok(Arc::new(rows))
            }
            Err(e) => {
                tracing::error!(table, operation = "select", error = %e, "backing store query failed");
                Err(e.into())
            }
        }
    }

    async fn fetch_count(&self, table: &str, options: &QueryOptions) -> Result<u64, QueryError> {
        let request = self.builder(table).build_count(options);
        let started = Instant::now();

        match self.store.count(&request).await {
            Ok(total) => {
                tracing::debug!(
                    table,
                    total,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "count executed"
                );
                Ok(total)
            }
            Err(e) => {
                tracing::error!(table, operation = "count", error = %e, "backing store count failed");
                Err(e.into())
            }
        }
    }

    /// One page of rows plus the total row count.
    ///
    /// The count is cached apart from the page data and shared by every page
    /// of the same filters.
    pub async fn execute_paginated_query(
        &self,
        table: &str,
        pagination: PaginationRequest,
        options: &QueryOptions,
        cache_key: Option<&str>,
    ) -> Result<PaginatedResult<Row>, QueryError> {
        pagination.validate()?;

        let count_key = match cache_key {
            Some(key) => format!("{}_count", key),
            None => format!("{}_count", options.count_key_base(table)),
        };
        let page_key = cache_key.map(|key| {
            format!("{}_page_{}_{}", key, pagination.page, pagination.page_size)
        });
        let page_options = options
            .clone()
            .offset(pagination.offset())
            .limit(pagination.page_size);

        let (total_count, items) = tokio::try_join!(
            self.cached(
                &count_key,
                None,
                CachedResult::Count,
                CachedResult::into_count,
                || self.fetch_count(table, options),
            ),
            self.execute_query(table, &page_options, page_key.as_deref(), None),
        )?;

        Ok(PaginatedResult::new(
            items.as_ref().clone(),
            pagination,
            total_count,
        ))
    }

    /// A single record of aggregates over the rows matching `options`,
    /// or an empty object when the store returns no rows
    pub async fn execute_aggregation_query(
        &self,
        table: &str,
        aggregations: &AggregationRequest,
        options: &QueryOptions,
        cache_key: Option<&str>,
    ) -> Result<Row, QueryError> {
        if aggregations.is_empty() {
            return Err(QueryError::EmptyAggregation(table.to_string()));
        }

        let agg_key = match cache_key {
            Some(key) => format!("{}_agg", key),
            None => options.aggregation_key(table, aggregations),
        };

        let record = self
            .cached(
                &agg_key,
                None,
                CachedResult::Record,
                CachedResult::into_record,
                move || async move {
                    let aggregate_options = options.clone().select(&aggregations.to_projection());
                    let rows = self
                        .execute_query(table, &aggregate_options, cache_key, None)
                        .await?;
                    Ok(Arc::new(rows.first().cloned().unwrap_or_else(|| json!({}))))
                },
            )
            .await?;

        Ok(record.as_ref().clone())
    }

    /// Rows of `base_table` with each related table embedded.
    ///
    /// An explicit `options.projection` is used as it is; otherwise one is
    /// composed from `joins`.
    pub async fn execute_join_query(
        &self,
        base_table: &str,
        joins: &[JoinSpec],
        options: &QueryOptions,
        cache_key: Option<&str>,
    ) -> Result<Arc<Vec<Row>>, QueryError> {
        let projection = match &options.projection {
            Some(projection) => projection.clone(),
            None => compose_join_projection(joins),
        };
        let join_options = options
            .clone()
            .select(&projection)
            .joins(joins.to_vec());

        self.execute_query(base_table, &join_options, cache_key, None)
            .await
    }
}
