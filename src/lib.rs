//! # Queryhaus
//!
//! A query optimization and caching layer for PostgreSQL. Reads go through a
//! bounded, TTL'd in-process cache before they reach the database; filtered,
//! paginated, aggregated and joined queries are all memoized.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use queryhaus::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let queryhaus = QueryHaus::connect(config).await?;
//!     let facade = queryhaus.facade();
//!
//!     let options = QueryOptions::new()
//!         .filter(FilterClause::eq("status", json!("published")))
//!         .order_by(OrderSpec::desc("created_at"));
//!
//!     let page = facade
//!         .execute_paginated_query("courses", PaginationRequest::new(1, 20), &options, None)
//!         .await?;
//!     println!("{} of {} courses", page.items.len(), page.total_count);
//!
//!     let summary = facade
//!         .execute_aggregation_query(
//!             "orders",
//!             &AggregationRequest::new().count_all().sum("total"),
//!             &QueryOptions::new(),
//!             None,
//!         )
//!         .await?;
//!     println!("{}", summary);
//!
//!     println!("{:?}", facade.get_cache_stats());
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod errors;
pub mod prelude;
pub mod routes;

// Re-export the main public types for convenience
pub use self::core::QueryHaus;
pub use errors::QueryHausError;
pub use routes::cache_router;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, DatabaseConfig, EvictionPolicy, QueryConfig, UnknownOperatorPolicy};

// Re-export internal crates used by the public API
pub use cache_system;
pub use store_object;

// Re-export external dependencies used in public API
pub use async_trait;
pub use axum;
pub use sqlx;
