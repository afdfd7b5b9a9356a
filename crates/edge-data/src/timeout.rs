//! Latency budget for counter lookups.

use std::time::Duration;

/// How long a lookup may take before it is reported as slow.
///
/// The edge platform bounds the whole invocation; this budget only flags
/// lookups that eat into it. A slow result is still used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupBudget {
    limit: Duration,
}

impl LookupBudget {
    /// Create a budget.
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    /// Create from milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// The budget.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Whether an observed duration went over budget.
    pub fn exceeded_by(&self, elapsed: Duration) -> bool {
        elapsed > self.limit
    }
}

impl Default for LookupBudget {
    fn default() -> Self {
        Self::from_millis(100)
    }
}
