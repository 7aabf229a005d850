//! Convenience re-exports for common store-object usage

// Backing store interface
pub use crate::traits::{BackingStore, CountRequest, Row, RowRange, SelectRequest};

// Error types
pub use crate::errors::{QueryError, StoreError};

// Postgres store
pub use crate::pg_store::PgStore;

// Facade
pub use crate::query_facade::{CachedResult, QueryFacade};

// Validation
pub use crate::validation::{ValidatedFieldName, ValidatedTableName, ValidationError};

// Query building
pub use crate::query_builder::{
    AggregationRequest, FilterClause, JoinSpec, JoinType, OperatorKind, OrderSpec,
    PaginatedResult, PaginationRequest, QueryBuilder, QueryOptions, RawFilterClause,
    RawQueryOptions,
};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use sqlx::PgPool;
