//! Observability for the variant view-count edge enricher.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging with request context
//! - `MetricsCollector` / `EnrichMetrics` - Per-invocation outcome and timing
//! - `OutcomeTally` - Outcome counts across many invocations

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;

// Re-export RequestId from edge-core for convenience
pub use edge_core::RequestId;
