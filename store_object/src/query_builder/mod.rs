//! Query builder utilities
//!
//! Query description types, the builder that turns them into backing-store
//! parameters, and the SQL rendering used by the Postgres store.

pub mod aggregation;
pub mod builder;
pub mod filter;
pub mod join;
pub mod options;
pub mod ordering;
pub mod pagination;
pub mod projection;
pub mod sql_generation;

#[cfg(test)]
mod tests;

pub use aggregation::{AggregateFunction, AggregationRequest};
pub use builder::{QueryBuilder, DEFAULT_WINDOW_SIZE};
pub use filter::{FilterClause, OperatorKind, RawFilterClause, UnknownOperator};
pub use join::{compose_join_projection, JoinSpec, JoinType};
pub use options::{QueryOptions, RawQueryOptions};
pub use ordering::OrderSpec;
pub use pagination::{PaginatedResult, PaginationRequest};
pub use projection::{parse_projection, ProjectionItem};
pub use sql_generation::{SqlGenerator, SqlStatement};
