//! View-count enrichment of variant responses at the edge.
//!
//! This crate provides:
//! - `parse_variant_path` - Extract a `VariantKey` from `/images/{id}/{size}.{ext}`
//! - `VariantHeaders` - The identity and counter headers for one variant
//! - `ResponseEnricher` - Parse, look up, inject; never fails the response
//!
//! # Example
//!
//! ```ignore
//! use edge_enrich::ResponseEnricher;
//! use edge_data::KvCounterStore;
//!
//! let enricher = ResponseEnricher::from_config(
//!     KvCounterStore::new(&config.counter_store, &config.counter_key_prefix),
//!     &config,
//! );
//! let response = enricher.enrich(event, &logger).await;
//! ```

mod enricher;
mod headers;
mod uri;

pub use enricher::*;
pub use headers::*;
pub use uri::*;
