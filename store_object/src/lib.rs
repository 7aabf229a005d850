//! Store Object - query layer for Queryhaus
//!
//! This crate provides the query description types, the builder that turns
//! them into backing-store reads, the Postgres backing store, identifier
//! validation, and the cached `QueryFacade` on top of them.

pub mod errors;
pub mod pg_store;
pub mod prelude;
pub mod query_builder;
pub mod query_facade;
pub mod traits;
pub mod validation;

pub use errors::{QueryError, StoreError};
pub use pg_store::PgStore;
pub use query_builder::{
    AggregationRequest, FilterClause, JoinSpec, JoinType, OperatorKind, OrderSpec,
    PaginatedResult, PaginationRequest, QueryBuilder, QueryOptions, RawFilterClause,
    RawQueryOptions,
};
pub use query_facade::{CachedResult, QueryFacade};
pub use traits::*;
pub use validation::{ValidatedFieldName, ValidatedTableName, ValidationError};

use sqlx::PgPool;

pub type DbPool = PgPool;
