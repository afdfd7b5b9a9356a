//! Core types for the variant view-count edge enricher.
//!
//! This crate provides the fundamental types:
//! - `EdgeEvent` - The in-flight request/response pair of one edge invocation
//! - `EventRecord` / `EventPayload` - CDN event record wire shape and its decoding
//! - `VariantKey` / `CounterRecord` - Counter identity and values
//! - `EnricherConfig` - Process-wide configuration
//! - `RequestId` / `TimingContext` - Invocation tracking
//! - `forward_request_headers` / `EdgeResponse::from_http` - Origin proxy conversions

mod config;
mod context;
mod event;
mod lifecycle;
mod proxy;
mod record;
mod variant;

pub use config::*;
pub use context::*;
pub use event::*;
pub use lifecycle::*;
pub use proxy::*;
pub use record::*;
pub use variant::*;
