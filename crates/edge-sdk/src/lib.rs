//! Public SDK for the variant view-count edge enricher.
//!
//! This crate re-exports everything an edge component needs:
//!
//! ```ignore
//! use edge_sdk::prelude::*;
//!
//! let config = EnricherConfig::resolve(|name| spin_sdk::variables::get(name).ok())?;
//! let enricher = ResponseEnricher::from_config(
//!     KvCounterStore::new(&config.counter_store, &config.counter_key_prefix),
//!     &config,
//! );
//!
//! let logger = StructuredLogger::from_config(RequestId::generate(), &config);
//! let response = enricher.enrich(event, &logger).await;
//! ```

pub use edge_core;
pub use edge_data;
pub use edge_enrich;
pub use edge_observability;

/// Prelude for convenient imports.
pub mod prelude {
    pub use edge_core::*;
    pub use edge_data::*;
    pub use edge_enrich::*;
    pub use edge_observability::*;
}
