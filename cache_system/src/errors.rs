//! Error types for cache operations
//!
//! Lookups, misses and expiry are normal control flow; only building a
//! cache with unusable parameters is an error.

use thiserror::Error;

/// Cache system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Invalid cache capacity: {0} (must be greater than 0)")]
    InvalidCapacity(usize),

    #[error("Invalid TTL value: {0}ms (must be greater than 0)")]
    InvalidTtl(u128),
}
