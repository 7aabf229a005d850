//! The read interface this layer delegates to
//!
//! A backing store takes a table name plus filter/order/range parameters and
//! returns rows or a count. Rows are opaque JSON records.

use crate::errors::StoreError;
use crate::query_builder::filter::FilterClause;
use crate::query_builder::join::JoinSpec;
use crate::query_builder::ordering::OrderSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One record as returned by the backing store
pub type Row = serde_json::Value;

/// Inclusive row window `[from, to]`; `to < from` selects nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    pub from: i64,
    pub to: i64,
}

impl RowRange {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    /// Number of rows in the window
    pub fn limit(&self) -> i64 {
        self.to.saturating_sub(self.from).saturating_add(1).max(0)
    }

    pub fn offset(&self) -> i64 {
        self.from
    }
}

/// Parameters of a row read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectRequest {
    pub table: String,
    pub projection: String,
    pub filters: Vec<FilterClause>,
    pub order_by: Vec<OrderSpec>,
    pub range: Option<RowRange>,
    pub joins: Vec<JoinSpec>,
}

/// Parameters of a row count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountRequest {
    pub table: String,
    pub filters: Vec<FilterClause>,
}

#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Rows of `request.table` matching the request
    async fn select(&self, request: &SelectRequest) -> Result<Vec<Row>, StoreError>;

    /// Number of rows of `request.table` matching the filters
    async fn count(&self, request: &CountRequest) -> Result<u64, StoreError>;
}

#[async_trait]
impl<S: BackingStore + ?Sized> BackingStore for std::sync::Arc<S> {
    async fn select(&self, request: &SelectRequest) -> Result<Vec<Row>, StoreError> {
        (**self).select(request).await
    }

    async fn count(&self, request: &CountRequest) -> Result<u64, StoreError> {
        (**self).count(request).await
    }
}
