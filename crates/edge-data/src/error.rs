//! Lookup error types.

use std::time::Duration;

/// A counter lookup that could not produce an answer.
///
/// Always recoverable: callers degrade to "no counters available".
#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    /// The store could not be opened.
    #[error("Counter store unavailable: {0}")]
    Unavailable(String),

    /// The read itself failed (throttling, transport, host error).
    #[error("Counter store read failed: {0}")]
    Store(String),

    /// The read did not complete in time.
    #[error("Counter lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The stored record could not be decoded.
    #[error("Malformed counter record: {0}")]
    Malformed(String),
}

impl LookupError {
    /// Short machine-friendly name for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Store(_) => "store",
            Self::Timeout(_) => "timeout",
            Self::Malformed(_) => "malformed",
        }
    }
}
