//! Counter store backends.

use std::collections::HashMap;

use async_trait::async_trait;
use edge_core::{CounterRecord, VariantKey};

use crate::decode::encode_record;
use crate::error::LookupError;

/// Point-read access to stored counter records.
///
/// Implementations perform exactly one read per call and never write.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Fetch the raw record stored for a variant, if any.
    async fn get(&self, key: &VariantKey) -> Result<Option<Vec<u8>>, LookupError>;
}

/// Counter store backed by a Spin key-value store.
///
/// Holds only the store label; the host owns the underlying connection and
/// reuses it across invocations.
#[derive(Debug, Clone)]
pub struct KvCounterStore {
    label: String,
    prefix: String,
}

impl KvCounterStore {
    /// Create a store client for a labeled store and key prefix.
    pub fn new(label: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prefix: prefix.into(),
        }
    }

    /// The store label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(target_arch = "wasm32")]
#[async_trait]
impl CounterStore for KvCounterStore {
    async fn get(&self, key: &VariantKey) -> Result<Option<Vec<u8>>, LookupError> {
        let store = spin_sdk::key_value::Store::open(&self.label)
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;
        store
            .get(&key.store_key(&self.prefix))
            .map_err(|e| LookupError::Store(e.to_string()))
    }
}

// Non-WASM builds have no host store to talk to.
#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl CounterStore for KvCounterStore {
    async fn get(&self, _key: &VariantKey) -> Result<Option<Vec<u8>>, LookupError> {
        Err(LookupError::Unavailable(format!(
            "key-value store '{}' requires the Spin host",
            self.label
        )))
    }
}

/// In-process counter store for tooling and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCounterStore {
    records: HashMap<VariantKey, Vec<u8>>,
}

impl MemoryCounterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record in the encoding the counting process writes.
    pub fn with_record(mut self, key: VariantKey, record: CounterRecord) -> Self {
        self.insert(key, record);
        self
    }

    /// Add raw stored bytes, valid or not.
    pub fn with_raw(mut self, key: VariantKey, bytes: impl Into<Vec<u8>>) -> Self {
        self.records.insert(key, bytes.into());
        self
    }

    /// Insert or replace a record.
    pub fn insert(&mut self, key: VariantKey, record: CounterRecord) {
        self.records.insert(key, encode_record(&record));
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn get(&self, key: &VariantKey) -> Result<Option<Vec<u8>>, LookupError> {
        Ok(self.records.get(key).cloned())
    }
}

/// Store whose every read fails with the given error.
#[derive(Debug, Clone)]
pub struct FailingCounterStore {
    error: LookupError,
}

impl FailingCounterStore {
    /// Create a store that always fails with `error`.
    pub fn new(error: LookupError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl CounterStore for FailingCounterStore {
    async fn get(&self, _key: &VariantKey) -> Result<Option<Vec<u8>>, LookupError> {
        Err(self.error.clone())
    }
}

#[async_trait]
impl<S: CounterStore + ?Sized> CounterStore for std::sync::Arc<S> {
    async fn get(&self, key: &VariantKey) -> Result<Option<Vec<u8>>, LookupError> {
        (**self).get(key).await
    }
}
