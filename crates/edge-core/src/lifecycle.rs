//! Invocation lifecycle tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Lifecycle phases of one enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    /// Event received.
    Start,
    /// Request path parsed into a variant key.
    Parsed,
    /// Counter lookup issued.
    LookupStarted,
    /// Counter lookup resolved (record, empty, or failure).
    LookupFinished,
    /// Response handed back for delivery.
    Completion,
}

impl LifecyclePhase {
    fn mark_name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Parsed => "parsed",
            Self::LookupStarted => "lookup_started",
            Self::LookupFinished => "lookup_finished",
            Self::Completion => "completion",
        }
    }
}

/// Timing context for observability.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<&'static str, Instant>,
}

impl TimingContext {
    /// Create a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
        }
    }

    /// Record that a phase was reached.
    pub fn mark(&mut self, phase: LifecyclePhase) {
        self.marks.insert(phase.mark_name(), Instant::now());
    }

    /// Time from start until a phase was reached.
    pub fn time_to(&self, phase: LifecyclePhase) -> Option<Duration> {
        self.marks
            .get(phase.mark_name())
            .map(|t| t.duration_since(self.start))
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}
