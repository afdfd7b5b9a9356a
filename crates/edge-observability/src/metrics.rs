//! Per-invocation enrichment metrics.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use edge_core::{LifecyclePhase, RequestId, TimingContext, VariantKey};
use serde::{Deserialize, Serialize};

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichOutcome {
    /// Not a variant URL; response untouched.
    Passthrough,
    /// Identity and counter headers added.
    Enriched,
    /// Identity headers added; no counter record exists.
    NoRecord,
    /// Identity headers added; the lookup failed and was suppressed.
    LookupFailed,
    /// A structural failure; original response returned verbatim.
    Ignored,
}

impl EnrichOutcome {
    /// Outcome name as used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::Enriched => "enriched",
            Self::NoRecord => "no_record",
            Self::LookupFailed => "lookup_failed",
            Self::Ignored => "ignored",
        }
    }
}

impl fmt::Display for EnrichOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics for a single enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichMetrics {
    /// Request ID for correlation.
    pub request_id: String,
    /// Variant key, if the path parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Final outcome.
    pub outcome: EnrichOutcome,
    /// Counter lookup duration (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_us: Option<u64>,
    /// Time from event receipt until the lookup resolved (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_lookup_us: Option<u64>,
    /// Whether the lookup exceeded its budget.
    pub lookup_over_budget: bool,
    /// Lookup error kind, if the lookup failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_error: Option<String>,
    /// Total enrichment duration (microseconds).
    pub total_us: u64,
}

/// Collector for enrichment metrics.
#[derive(Debug)]
pub struct MetricsCollector {
    request_id: RequestId,
    variant: Option<String>,
    timing: TimingContext,
    lookup: Option<Duration>,
    over_budget: bool,
    lookup_error: Option<String>,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new(request_id: RequestId) -> Self {
        let mut timing = TimingContext::new();
        timing.mark(LifecyclePhase::Start);

        Self {
            request_id,
            variant: None,
            timing,
            lookup: None,
            over_budget: false,
            lookup_error: None,
        }
    }

    /// Record that a lifecycle phase was reached.
    pub fn mark(&mut self, phase: LifecyclePhase) {
        self.timing.mark(phase);
    }

    /// Record the parsed variant.
    pub fn record_variant(&mut self, key: &VariantKey) {
        self.timing.mark(LifecyclePhase::Parsed);
        self.variant = Some(key.to_string());
    }

    /// Record a finished lookup.
    pub fn record_lookup(&mut self, duration: Duration, over_budget: bool, error: Option<&str>) {
        self.timing.mark(LifecyclePhase::LookupFinished);
        self.lookup = Some(duration);
        self.over_budget = over_budget;
        self.lookup_error = error.map(String::from);
    }

    /// Finalize and return the metrics.
    pub fn finalize(mut self, outcome: EnrichOutcome) -> EnrichMetrics {
        self.timing.mark(LifecyclePhase::Completion);
        let micros = |d: Duration| d.as_micros() as u64;

        EnrichMetrics {
            request_id: self.request_id.to_string(),
            variant: self.variant,
            outcome,
            lookup_us: self.lookup.map(micros),
            time_to_lookup_us: self
                .timing
                .time_to(LifecyclePhase::LookupFinished)
                .map(micros),
            lookup_over_budget: self.over_budget,
            lookup_error: self.lookup_error,
            total_us: self
                .timing
                .time_to(LifecyclePhase::Completion)
                .map(micros)
                .unwrap_or_default(),
        }
    }
}

impl EnrichMetrics {
    /// Format as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Format as human-readable summary.
    pub fn to_summary(&self) -> String {
        let mut lines = vec![format!("Request: {} [{}]", self.request_id, self.outcome)];

        if let Some(variant) = &self.variant {
            lines.push(format!("  Variant: {}", variant));
        }

        if let Some(us) = self.lookup_us {
            let slow = if self.lookup_over_budget { " [over budget]" } else { "" };
            lines.push(format!("  Lookup: {}us ({:.2}ms){}", us, us as f64 / 1000.0, slow));
        }

        if let Some(error) = &self.lookup_error {
            lines.push(format!("  Lookup error: {}", error));
        }

        lines.push(format!(
            "  Total: {}us ({:.2}ms)",
            self.total_us,
            self.total_us as f64 / 1000.0
        ));

        lines.join("\n")
    }
}

/// Outcome tally across many enrichments.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutcomeTally {
    counts: BTreeMap<EnrichOutcome, u64>,
    slow_lookups: u64,
}

impl OutcomeTally {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one enrichment.
    pub fn record(&mut self, metrics: &EnrichMetrics) {
        *self.counts.entry(metrics.outcome).or_default() += 1;
        if metrics.lookup_over_budget {
            self.slow_lookups += 1;
        }
    }

    /// Count for an outcome.
    pub fn count(&self, outcome: EnrichOutcome) -> u64 {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }

    /// Total enrichments recorded.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Lookups that went over budget.
    pub fn slow_lookups(&self) -> u64 {
        self.slow_lookups
    }

    /// Outcomes with their counts, in outcome order.
    pub fn iter(&self) -> impl Iterator<Item = (EnrichOutcome, u64)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_lookup_metrics() {
        let mut collector = MetricsCollector::new(RequestId::from_string("r1"));
        collector.record_variant(&VariantKey::new("abc123", "thumb"));
        collector.record_lookup(Duration::from_micros(1500), true, Some("timeout"));

        let metrics = collector.finalize(EnrichOutcome::LookupFailed);
        assert_eq!(metrics.variant.as_deref(), Some("abc123/thumb"));
        assert_eq!(metrics.lookup_us, Some(1500));
        assert!(metrics.time_to_lookup_us.is_some());
        assert!(metrics.lookup_over_budget);

        let summary = metrics.to_summary();
        assert!(summary.contains("[lookup_failed]"));
        assert!(summary.contains("[over budget]"));
        assert!(summary.contains("Lookup error: timeout"));
    }

    #[test]
    fn test_passthrough_has_no_lookup() {
        let metrics = MetricsCollector::new(RequestId::from_string("r2"))
            .finalize(EnrichOutcome::Passthrough);
        let json: serde_json::Value = serde_json::from_str(&metrics.to_json()).unwrap();
        assert_eq!(json["outcome"], "passthrough");
        assert!(json.get("lookup_us").is_none());
        assert!(json.get("variant").is_none());
    }

    #[test]
    fn test_tally() {
        let mut tally = OutcomeTally::new();
        for outcome in [
            EnrichOutcome::Enriched,
            EnrichOutcome::Enriched,
            EnrichOutcome::Passthrough,
        ] {
            tally.record(&MetricsCollector::new(RequestId::from_string("r")).finalize(outcome));
        }

        assert_eq!(tally.total(), 3);
        assert_eq!(tally.count(EnrichOutcome::Enriched), 2);
        assert_eq!(tally.count(EnrichOutcome::NoRecord), 0);
        assert_eq!(tally.slow_lookups(), 0);
    }
}
