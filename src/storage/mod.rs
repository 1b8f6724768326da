//! Storage layer
//!
//! SQL backends implement [`crate::models::Database`] outside this crate;
//! the in-memory store here backs tests and embedded use.

pub mod memory;

pub use memory::{MemoryStore, MemoryTransaction};
