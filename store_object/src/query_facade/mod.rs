//! Query facade
//!
//! The entry point callers use: every read goes through the cache first and
//! reaches the backing store only on a miss.

mod admin;
mod core;
mod query;


pub use self::core::{CachedResult, QueryFacade};
