//! Convenience re-exports for common cache-system usage

// Core cache system components
pub use crate::entry::CacheEntry;
pub use crate::errors::CacheError;
pub use crate::keys::{build_query_key, canonical_json, hash_canonical};
pub use crate::stats::CacheStats;
pub use crate::store::CacheStore;

// Re-export centralized config
pub use config::{CacheConfig, EvictionPolicy};
