//! Query options and the cache keys derived from them

use crate::errors::QueryError;
use crate::query_builder::aggregation::AggregationRequest;
use crate::query_builder::filter::{FilterClause, OperatorKind, RawFilterClause};
use crate::query_builder::join::JoinSpec;
use crate::query_builder::ordering::OrderSpec;
use cache_system::keys::{build_query_key, canonical_json, hash_canonical};
use config::UnknownOperatorPolicy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured description of a read against one table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryOptions {
    /// Defaults to `*`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<String>,
    pub filters: Vec<FilterClause>,
    pub order_by: Vec<OrderSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Related tables referenced by embedded resources in the projection
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<JoinSpec>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, projection: &str) -> Self {
        self.projection = Some(projection.to_string());
        self
    }

    /// Add a filter condition
    pub fn filter(mut self, filter: FilterClause) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add multiple filters (combined with AND)
    pub fn filters(mut self, filters: Vec<FilterClause>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Add ordering
    pub fn order_by(mut self, order: OrderSpec) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn joins(mut self, joins: Vec<JoinSpec>) -> Self {
        self.joins = joins;
        self
    }

    /// Encoding in which semantically equal options are byte-equal:
    /// filters and joins are sorted, `in` lists are sorted, ordering is kept
    pub fn canonical_value(&self) -> Value {
        json!({
            "projection": self.projection.as_deref().unwrap_or("*"),
            "filters": canonical_filters(&self.filters),
            "orderBy": self.order_by,
            "limit": self.limit,
            "offset": self.offset,
            "joins": sorted_by_canonical(self.joins.iter().map(|j| json!(j)).collect()),
        })
    }

    /// `<table>:query:<hash>`
    pub fn cache_key(&self, table: &str) -> String {
        build_query_key(table, &hash_canonical(&self.canonical_value()))
    }

    /// Base of the row-count key: depends on the filters only, so every page shares it
    pub fn count_key_base(&self, table: &str) -> String {
        format!("{}:{}", table, hash_canonical(&canonical_filters(&self.filters)))
    }

    /// `<table>_agg:<hash>` over the aggregation request and these options
    pub fn aggregation_key(&self, table: &str, aggregations: &AggregationRequest) -> String {
        let keyed = json!({
            "aggregations": aggregations,
            "options": self.canonical_value(),
        });
        format!("{}_agg:{}", table, hash_canonical(&keyed))
    }
}

fn sorted_by_canonical(mut values: Vec<Value>) -> Value {
    values.sort_by_cached_key(canonical_json);
    Value::Array(values)
}

fn canonical_filters(filters: &[FilterClause]) -> Value {
    let encoded = filters
        .iter()
        .map(|clause| {
            let value = match (&clause.operator, &clause.value) {
                (OperatorKind::In, Value::Array(items)) => sorted_by_canonical(items.clone()),
                (_, value) => value.clone(),
            };
            json!({
                "column": clause.column,
                "operator": clause.operator.as_str(),
                "value": value,
            })
        })
        .collect();

    sorted_by_canonical(encoded)
}

/// Query options as received from outside, before operator checking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawQueryOptions {
    pub projection: Option<String>,
    pub filters: Vec<RawFilterClause>,
    pub order_by: Vec<OrderSpec>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub joins: Vec<JoinSpec>,
}

impl RawQueryOptions {
    /// Type-check every filter operator under `policy`
    pub fn resolve(self, policy: UnknownOperatorPolicy) -> Result<QueryOptions, QueryError> {
        let mut filters = Vec::with_capacity(self.filters.len());
        for raw in self.filters {
            if let Some(clause) = raw.resolve(policy)? {
                filters.push(clause);
            }
        }

        Ok(QueryOptions {
            projection: self.projection,
            filters,
            order_by: self.order_by,
            limit: self.limit,
            offset: self.offset,
            joins: self.joins,
        })
    }
}
