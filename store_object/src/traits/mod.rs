//! Trait definitions
//!
//! This module defines the seam between the query layer and the store it reads from.

pub mod backing_store;

pub use backing_store::{BackingStore, CountRequest, Row, RowRange, SelectRequest};
