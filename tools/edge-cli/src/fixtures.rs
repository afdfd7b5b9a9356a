//! Event and counter fixtures for local enrichment runs.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use edge_core::{EventPayload, VariantKey};
use edge_data::{CounterStore, FailingCounterStore, LookupError, MemoryCounterStore};

/// Read one CDN event record.
///
/// Only a record with no deliverable response is an error.
pub fn load_event(path: &Path) -> Result<EventPayload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read event: {}", path.display()))?;
    EventPayload::from_json(&bytes)
        .with_context(|| format!("Invalid event record: {}", path.display()))
}

/// Read a counters fixture.
///
/// The file maps `"<imageId>/<size>"` to a record stored exactly as the
/// counting process would write it, e.g. `{"views": 7, "pixelsViewed": 350}`.
pub fn load_counters(path: &Path) -> Result<MemoryCounterStore> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read counters: {}", path.display()))?;
    parse_counters(&content).with_context(|| format!("Invalid counters: {}", path.display()))
}

fn parse_counters(content: &str) -> Result<MemoryCounterStore> {
    let entries: BTreeMap<String, serde_json::Value> = serde_json::from_str(content)?;

    let mut store = MemoryCounterStore::new();
    for (variant, record) in entries {
        let Some((image_id, size)) = variant.split_once('/') else {
            bail!("'{}' is not of the form <imageId>/<size>", variant);
        };
        store = store.with_raw(VariantKey::new(image_id, size), record.to_string());
    }

    Ok(store)
}

/// Counter store for a local run.
///
/// `fail_lookup` simulates a store that times out on every read.
pub fn counter_store(
    counters: Option<&Path>,
    fail_lookup: bool,
    budget: Duration,
) -> Result<Arc<dyn CounterStore>> {
    if fail_lookup {
        return Ok(Arc::new(FailingCounterStore::new(LookupError::Timeout(
            budget,
        ))));
    }

    Ok(match counters {
        Some(path) => Arc::new(load_counters(path)?),
        None => Arc::new(MemoryCounterStore::new()),
    })
}
