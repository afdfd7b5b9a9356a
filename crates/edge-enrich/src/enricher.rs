//! Response enrichment.

use edge_core::{EdgeEvent, EdgeResponse, EnricherConfig, EventPayload, LifecyclePhase};
use edge_data::{CounterClient, CounterStore, LookupBudget};
use edge_observability::{EnrichMetrics, EnrichOutcome, MetricsCollector, StructuredLogger};

use crate::headers::{InvalidHeader, VariantHeaders};
use crate::uri::parse_variant_path;

/// Why an event was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IgnoreReason {
    #[error("Variant identity cannot be sent as a header: {0}")]
    InvalidHeader(#[from] InvalidHeader),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),
}

/// An event the enricher gave up on.
///
/// Carries the response exactly as it arrived.
#[derive(Debug, Clone)]
pub struct Ignored {
    response: EdgeResponse,
    reason: IgnoreReason,
}

impl Ignored {
    /// Why the event was ignored.
    pub fn reason(&self) -> &IgnoreReason {
        &self.reason
    }

    /// The original response.
    pub fn into_response(self) -> EdgeResponse {
        self.response
    }
}

/// A response that went through the enricher.
#[derive(Debug, Clone)]
pub struct Enriched {
    /// The response to deliver.
    pub response: EdgeResponse,
    /// What the enricher did to it.
    pub outcome: EnrichOutcome,
}

impl Enriched {
    /// The response to deliver.
    pub fn into_response(self) -> EdgeResponse {
        self.response
    }
}

/// Adds variant identity and view-count headers to image responses.
///
/// Never fails the response: lookup problems drop the counter headers and
/// structural problems return the original response.
#[derive(Debug, Clone)]
pub struct ResponseEnricher<S> {
    client: CounterClient<S>,
}

impl<S: CounterStore> ResponseEnricher<S> {
    /// Create an enricher over a lookup client.
    pub fn new(client: CounterClient<S>) -> Self {
        Self { client }
    }

    /// Create an enricher over a store, using the configured lookup budget.
    pub fn from_config(store: S, config: &EnricherConfig) -> Self {
        Self::new(
            CounterClient::new(store).with_budget(LookupBudget::new(config.lookup_budget())),
        )
    }

    /// The lookup client.
    pub fn client(&self) -> &CounterClient<S> {
        &self.client
    }

    /// Enrich one event, reporting structural failures to the caller.
    ///
    /// Only response headers are written. Status and body pass through.
    pub async fn try_enrich(
        &self,
        event: EdgeEvent,
        metrics: &mut MetricsCollector,
        logger: &StructuredLogger,
    ) -> Result<Enriched, Ignored> {
        let EdgeEvent {
            request,
            mut response,
        } = event;

        let Some(key) = parse_variant_path(&request.uri) else {
            return Ok(Enriched {
                response,
                outcome: EnrichOutcome::Passthrough,
            });
        };
        metrics.record_variant(&key);

        let headers = match VariantHeaders::for_variant(&key) {
            Ok(headers) => headers,
            Err(err) => {
                return Err(Ignored {
                    response,
                    reason: err.into(),
                })
            }
        };

        metrics.mark(LifecyclePhase::LookupStarted);
        let lookup = self.client.lookup_timed(&key).await;
        metrics.record_lookup(
            lookup.elapsed,
            lookup.over_budget,
            lookup.result.as_ref().err().map(|e| e.kind()),
        );

        if lookup.over_budget {
            logger
                .warn_builder("Counter lookup over budget")
                .field("variant", key.to_string())
                .duration_us("lookup_us", lookup.elapsed)
                .duration_us("budget_us", self.client.budget().limit())
                .emit();
        }

        let (headers, outcome) = match lookup.result {
            Ok(Some(record)) => (headers.with_counters(record), EnrichOutcome::Enriched),
            Ok(None) => (headers, EnrichOutcome::NoRecord),
            Err(err) => {
                logger
                    .warn_builder("Counter lookup failed")
                    .field("variant", key.to_string())
                    .field("kind", err.kind())
                    .field("error", err.to_string())
                    .emit();
                (headers, EnrichOutcome::LookupFailed)
            }
        };

        headers.apply(&mut response.headers);
        Ok(Enriched { response, outcome })
    }

    /// Enrich a decoded event record.
    ///
    /// A record whose request part is malformed is ignored with its
    /// response untouched.
    pub async fn try_enrich_payload(
        &self,
        payload: EventPayload,
        metrics: &mut MetricsCollector,
        logger: &StructuredLogger,
    ) -> Result<Enriched, Ignored> {
        match payload {
            EventPayload::Event(event) => self.try_enrich(event, metrics, logger).await,
            EventPayload::MalformedRequest { response, reason } => Err(Ignored {
                response,
                reason: IgnoreReason::MalformedEvent(reason),
            }),
        }
    }

    /// Enrich one event and return the response with its metrics.
    pub async fn enrich_observed(
        &self,
        event: impl Into<EventPayload>,
        logger: &StructuredLogger,
    ) -> (EdgeResponse, EnrichMetrics) {
        let mut metrics = MetricsCollector::new(logger.request_id().clone());

        let (response, outcome) = match self
            .try_enrich_payload(event.into(), &mut metrics, logger)
            .await
        {
            Ok(enriched) => (enriched.response, enriched.outcome),
            Err(ignored) => {
                logger
                    .warn_builder("Event ignored")
                    .field("reason", ignored.reason().to_string())
                    .emit();
                (ignored.into_response(), EnrichOutcome::Ignored)
            }
        };

        let metrics = metrics.finalize(outcome);
        logger
            .debug_builder("Enrichment complete")
            .field("outcome", outcome.as_str())
            .field_u64("total_us", metrics.total_us)
            .field_bool("lookup_over_budget", metrics.lookup_over_budget)
            .emit();

        (response, metrics)
    }

    /// Enrich one event.
    pub async fn enrich(
        &self,
        event: impl Into<EventPayload>,
        logger: &StructuredLogger,
    ) -> EdgeResponse {
        self.enrich_observed(event, logger).await.0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use edge_core::{CounterRecord, EdgeRequest, RequestId, VariantKey};
    use edge_data::{FailingCounterStore, LookupError, MemoryCounterStore};
    use futures::executor::block_on;
    use http::{HeaderValue, StatusCode};

    use super::*;
    use crate::headers::header_names::*;

    fn event(path: &str) -> EdgeEvent {
        let mut response = EdgeResponse::new(StatusCode::OK, b"jpeg".to_vec());
        response
            .headers
            .insert("content-type", HeaderValue::from_static("image/jpeg"));
        EdgeEvent::new(EdgeRequest::new(path), response)
    }

    fn store() -> MemoryCounterStore {
        MemoryCounterStore::new().with_record(
            VariantKey::new("abc123", "thumb"),
            CounterRecord::new(7, 350),
        )
    }

    fn logger() -> StructuredLogger {
        StructuredLogger::quiet()
    }

    #[test]
    fn test_enriched() {
        let enricher = ResponseEnricher::new(CounterClient::new(store()));
        let (response, metrics) =
            block_on(enricher.enrich_observed(event("/images/abc123/thumb.jpg"), &logger()));

        assert_eq!(metrics.outcome, EnrichOutcome::Enriched);
        assert_eq!(response.header(X_IMAGE_ID), Some("abc123"));
        assert_eq!(response.header(X_IMAGE_SIZE), Some("thumb"));
        assert_eq!(response.header(X_VIEWS), Some("7"));
        assert_eq!(response.header(X_PIXELS_VIEWED), Some("350"));
        assert_eq!(response.header("content-type"), Some("image/jpeg"));
        assert_eq!(response.body, b"jpeg");
    }

    #[test]
    fn test_passthrough_does_not_touch_response() {
        let enricher = ResponseEnricher::new(CounterClient::new(store()));
        let original = event("/favicon.ico");
        let (response, metrics) =
            block_on(enricher.enrich_observed(original.clone(), &logger()));

        assert_eq!(metrics.outcome, EnrichOutcome::Passthrough);
        assert!(metrics.lookup_us.is_none());
        assert_eq!(response, original.response);
    }

    #[test]
    fn test_no_record() {
        let enricher = ResponseEnricher::new(CounterClient::new(store()));
        let (response, metrics) =
            block_on(enricher.enrich_observed(event("/images/abc123/large.webp"), &logger()));

        assert_eq!(metrics.outcome, EnrichOutcome::NoRecord);
        assert_eq!(response.header(X_IMAGE_SIZE), Some("large"));
        assert!(response.header(X_VIEWS).is_none());
        assert!(response.header(X_PIXELS_VIEWED).is_none());
    }

    #[test]
    fn test_lookup_failure_keeps_identity_headers() {
        let enricher = ResponseEnricher::new(CounterClient::new(FailingCounterStore::new(
            LookupError::Timeout(Duration::from_millis(100)),
        )));
        let (response, metrics) =
            block_on(enricher.enrich_observed(event("/images/abc123/thumb.jpg"), &logger()));

        assert_eq!(metrics.outcome, EnrichOutcome::LookupFailed);
        assert_eq!(metrics.lookup_error.as_deref(), Some("timeout"));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.header(X_IMAGE_ID), Some("abc123"));
        assert!(response.header(X_VIEWS).is_none());
    }

    #[test]
    fn test_invalid_identity_is_ignored() {
        let enricher = ResponseEnricher::new(CounterClient::new(store()));
        let original = event("/images/abc\u{1}123/thumb.jpg");
        let mut metrics = MetricsCollector::new(RequestId::from_string("r1"));

        let ignored = block_on(enricher.try_enrich(original.clone(), &mut metrics, &logger()))
            .unwrap_err();
        assert!(matches!(ignored.reason(), IgnoreReason::InvalidHeader(_)));
        assert_eq!(ignored.into_response(), original.response);

        let (response, metrics) = block_on(enricher.enrich_observed(original.clone(), &logger()));
        assert_eq!(metrics.outcome, EnrichOutcome::Ignored);
        assert!(metrics.lookup_us.is_none());
        assert_eq!(response, original.response);
    }

    #[test]
    fn test_malformed_request_is_ignored() {
        let enricher = ResponseEnricher::new(CounterClient::new(store()));
        let original = event("/images/abc123/thumb.jpg").response;
        let payload = EventPayload::MalformedRequest {
            response: original.clone(),
            reason: "Event record has no request".to_string(),
        };
        let mut metrics = MetricsCollector::new(RequestId::from_string("r1"));

        let ignored =
            block_on(enricher.try_enrich_payload(payload.clone(), &mut metrics, &logger()))
                .unwrap_err();
        assert!(matches!(ignored.reason(), IgnoreReason::MalformedEvent(_)));

        let (response, metrics) = block_on(enricher.enrich_observed(payload, &logger()));
        assert_eq!(metrics.outcome, EnrichOutcome::Ignored);
        assert!(metrics.lookup_us.is_none());
        assert_eq!(response, original);
    }

    #[test]
    fn test_from_config_applies_budget() {
        let config = EnricherConfig {
            lookup_budget_ms: 25,
            ..EnricherConfig::default()
        };
        let enricher = ResponseEnricher::from_config(MemoryCounterStore::new(), &config);
        assert_eq!(
            enricher.client().budget().limit(),
            Duration::from_millis(25)
        );
    }
}
