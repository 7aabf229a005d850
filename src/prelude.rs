//! Convenience re-exports for common Queryhaus usage
//!
//! # Example
//!
//! ```rust
//! use queryhaus::prelude::*;
//!
//! let options = QueryOptions::new().limit(2);
//! assert!(options.cache_key("packages").starts_with("packages:query:"));
//! ```

// Core Queryhaus components
pub use crate::core::QueryHaus;
pub use crate::errors::QueryHausError;
pub use crate::routes::cache_router;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, DatabaseConfig, EvictionPolicy, QueryConfig, UnknownOperatorPolicy};

// Re-export commonly used store-object types for convenience
pub use store_object::prelude::*;

// Re-export cache system
pub use cache_system::prelude::*;

// Common external dependencies
pub use async_trait;
pub use sqlx;
pub use tokio;
