//! Query builder
//!
//! Translates a table name and `QueryOptions` into the parameters of a
//! single backing-store read.

use crate::query_builder::options::QueryOptions;
use crate::traits::backing_store::{CountRequest, RowRange, SelectRequest};

/// Window size used when an offset arrives without a limit
pub const DEFAULT_WINDOW_SIZE: i64 = 10;

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    window_size: i64,
}

impl QueryBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }

    pub fn with_window_size(mut self, window_size: i64) -> Self {
        self.window_size = window_size.max(1);
        self
    }

    /// Row range for `limit`/`offset`: an offset opens the window
    /// `[offset, offset + limit - 1]`, a bare limit the window `[0, limit - 1]`
    pub fn range(&self, options: &QueryOptions) -> Option<RowRange> {
        match (options.offset, options.limit) {
            (Some(offset), limit) => {
                let from = offset.max(0);
                let size = limit.unwrap_or(self.window_size).max(0);
                // Windows running past i64::MAX are clipped there
                Some(RowRange::new(from, from.saturating_add(size - 1)))
            }
            (None, Some(limit)) => Some(RowRange::new(0, limit.max(0) - 1)),
            (None, None) => None,
        }
    }

    /// Build the select parameters; filters and ordering keep their list order
    pub fn build(&self, options: &QueryOptions) -> SelectRequest {
        SelectRequest {
            table: self.table.clone(),
            projection: options
                .projection
                .clone()
                .unwrap_or_else(|| "*".to_string()),
            filters: options.filters.clone(),
            order_by: options.order_by.clone(),
            range: self.range(options),
            joins: options.joins.clone(),
        }
    }

    /// Build the count parameters; only the filters matter
    pub fn build_count(&self, options: &QueryOptions) -> CountRequest {
        CountRequest {
            table: self.table.clone(),
            filters: options.filters.clone(),
        }
    }
}
