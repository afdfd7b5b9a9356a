//! Counter lookup client.

use std::time::{Duration, Instant};

use edge_core::{CounterRecord, VariantKey};

use crate::decode::decode_record;
use crate::error::LookupError;
use crate::store::CounterStore;
use crate::timeout::LookupBudget;

/// Result of one counter lookup, with how long it took.
#[derive(Debug)]
pub struct Lookup {
    /// Record, absence, or failure.
    pub result: Result<Option<CounterRecord>, LookupError>,
    /// Time spent waiting on the store.
    pub elapsed: Duration,
    /// Whether `elapsed` went over the client's budget.
    pub over_budget: bool,
}

/// Reads per-variant counters from a store.
///
/// Issues a single eventually-consistent read per lookup. There are no
/// retries: the enrichment path is latency-critical and a missing count is
/// an acceptable answer.
#[derive(Debug, Clone)]
pub struct CounterClient<S> {
    store: S,
    budget: LookupBudget,
}

impl<S: CounterStore> CounterClient<S> {
    /// Create a client over a store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            budget: LookupBudget::default(),
        }
    }

    /// Set the latency budget.
    pub fn with_budget(mut self, budget: LookupBudget) -> Self {
        self.budget = budget;
        self
    }

    /// The latency budget.
    pub fn budget(&self) -> LookupBudget {
        self.budget
    }

    /// Look up the counters of a variant.
    pub async fn lookup(&self, key: &VariantKey) -> Result<Option<CounterRecord>, LookupError> {
        match self.store.get(key).await? {
            Some(bytes) => decode_record(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Look up the counters of a variant and time the read.
    pub async fn lookup_timed(&self, key: &VariantKey) -> Lookup {
        let started = Instant::now();
        let result = self.lookup(key).await;
        let elapsed = started.elapsed();

        Lookup {
            result,
            elapsed,
            over_budget: self.budget.exceeded_by(elapsed),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use futures::executor::block_on;

    use super::*;
    use crate::store::{FailingCounterStore, MemoryCounterStore};

    /// Counts reads so tests can assert single-attempt behavior.
    struct CountingStore {
        reads: AtomicUsize,
        inner: FailingCounterStore,
    }

    #[async_trait]
    impl CounterStore for CountingStore {
        async fn get(&self, key: &VariantKey) -> Result<Option<Vec<u8>>, LookupError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get(key).await
        }
    }

    fn key() -> VariantKey {
        VariantKey::new("abc123", "thumb")
    }

    #[test]
    fn test_found_record() {
        let client = CounterClient::new(
            MemoryCounterStore::new().with_record(key(), CounterRecord::new(42, 1000)),
        );
        assert_eq!(
            block_on(client.lookup(&key())).unwrap(),
            Some(CounterRecord::new(42, 1000))
        );
    }

    #[test]
    fn test_missing_record() {
        let client = CounterClient::new(MemoryCounterStore::new());
        assert_eq!(block_on(client.lookup(&key())).unwrap(), None);
    }

    #[test]
    fn test_partial_record_defaults_to_zero() {
        let client = CounterClient::new(
            MemoryCounterStore::new().with_raw(key(), br#"{"views": "5"}"#.to_vec()),
        );
        assert_eq!(
            block_on(client.lookup(&key())).unwrap(),
            Some(CounterRecord::new(5, 0))
        );
    }

    #[test]
    fn test_malformed_record_is_lookup_error() {
        let client =
            CounterClient::new(MemoryCounterStore::new().with_raw(key(), b"{oops".to_vec()));
        assert!(matches!(
            block_on(client.lookup(&key())),
            Err(LookupError::Malformed(_))
        ));
    }

    #[test]
    fn test_failure_is_not_retried() {
        let store = Arc::new(CountingStore {
            reads: AtomicUsize::new(0),
            inner: FailingCounterStore::new(LookupError::Store("throttled".to_string())),
        });
        let client = CounterClient::new(store.clone());

        let lookup = block_on(client.lookup_timed(&key()));
        assert!(matches!(lookup.result, Err(LookupError::Store(_))));
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_budget_flags_lookup() {
        let client = CounterClient::new(MemoryCounterStore::new())
            .with_budget(LookupBudget::new(Duration::ZERO));
        let lookup = block_on(client.lookup_timed(&key()));
        assert!(lookup.result.is_ok());
        assert_eq!(lookup.over_budget, lookup.elapsed > Duration::ZERO);
    }
}
