//! Error types for the Queryhaus crate
//!
//! Errors raised while wiring the layer together. Query-time failures are
//! `store_object::QueryError`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryHausError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Cache configuration error: {0}")]
    Cache(#[from] cache_system::CacheError),
}
