//! Counter store access for the variant view-count edge enricher.
//!
//! This crate provides:
//! - `CounterStore` - Point-read seam over the key-value backend
//! - `KvCounterStore` - Spin key-value store backend
//! - `MemoryCounterStore` - In-process backend for tooling and tests
//! - `CounterClient` - Single-attempt lookup with typed decoding
//! - `LookupBudget` - Latency budget for lookups

mod client;
mod decode;
mod error;
mod store;
mod timeout;

pub use client::*;
pub use decode::*;
pub use error::*;
pub use store::*;
pub use timeout::*;
