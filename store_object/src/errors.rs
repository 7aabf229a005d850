use crate::validation::ValidationError;
use thiserror::Error;

/// Failure reported by a backing store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error on '{table}' during {operation}: {source}")]
    Database {
        table: String,
        operation: &'static str,
        source: sqlx::Error,
    },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] ValidationError),

    #[error("Invalid filter on column '{column}': {reason}")]
    InvalidFilter { column: String, reason: String },

    #[error("Unsupported projection: {0}")]
    UnsupportedProjection(String),

    #[error("Backing store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn database_operation(table: &str, operation: &'static str, source: sqlx::Error) -> Self {
        Self::Database {
            table: table.to_string(),
            operation,
            source,
        }
    }
}

/// Errors returned by the query facade
#[derive(Error, Debug)]
pub enum QueryError {
    /// Carried through untouched from the backing store
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Unknown filter operator '{operator}' on column '{column}'")]
    UnknownOperator { column: String, operator: String },

    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Aggregation request for '{0}' names no columns")]
    EmptyAggregation(String),
}

impl QueryError {
    /// The underlying store error, if this is one
    pub fn as_store_error(&self) -> Option<&StoreError> {
        match self {
            QueryError::Store(e) => Some(e),
            _ => None,
        }
    }
}
