//! Cache system for in-process query result caching
//!
//! This crate provides a bounded, TTL-based cache store with configurable
//! eviction, hit/miss accounting, per-key miss coalescing and helpers for
//! deriving stable cache keys.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod entry;
pub mod errors;
mod inflight;
pub mod keys;
pub mod prelude;
pub mod stats;
pub mod store;

// Re-export centralized config
pub use config::{CacheConfig, EvictionPolicy};

pub use entry::CacheEntry;
pub use errors::CacheError;
pub use stats::CacheStats;
pub use store::CacheStore;
