//! End-to-end enrichment scenarios over in-memory and failing stores.

use std::time::Duration;

use edge_core::{CounterRecord, EdgeEvent, EdgeRequest, EdgeResponse, EventPayload, VariantKey};
use edge_data::{CounterClient, FailingCounterStore, LookupError, MemoryCounterStore};
use edge_enrich::header_names::*;
use edge_enrich::ResponseEnricher;
use edge_observability::{EnrichOutcome, StructuredLogger};
use futures::executor::block_on;
use http::{HeaderValue, StatusCode};

fn image_response() -> EdgeResponse {
    let mut response = EdgeResponse::new(StatusCode::OK, vec![0xff, 0xd8, 0xff, 0xe0]);
    response
        .headers
        .insert("content-type", HeaderValue::from_static("image/jpeg"));
    response
        .headers
        .insert("cache-control", HeaderValue::from_static("max-age=86400"));
    response
}

fn event(path: &str) -> EdgeEvent {
    EdgeEvent::new(EdgeRequest::new(path), image_response())
}

fn enricher_with(records: &[(&str, &str, u64, u64)]) -> ResponseEnricher<MemoryCounterStore> {
    let mut store = MemoryCounterStore::new();
    for (id, size, views, pixels) in records {
        store.insert(VariantKey::new(*id, *size), CounterRecord::new(*views, *pixels));
    }
    ResponseEnricher::new(CounterClient::new(store))
}

fn logger() -> StructuredLogger {
    StructuredLogger::quiet()
}

/// Store holding the demo counters exactly as recorded in `demos/counters.json`.
fn demo_enricher() -> ResponseEnricher<MemoryCounterStore> {
    let entries: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(include_str!("../../../demos/counters.json")).unwrap();

    let mut store = MemoryCounterStore::new();
    for (variant, record) in entries {
        let (id, size) = variant.split_once('/').unwrap();
        store = store.with_raw(VariantKey::new(id, size), record.to_string());
    }
    ResponseEnricher::new(CounterClient::new(store))
}

fn demo_event(json: &str) -> EventPayload {
    EventPayload::from_json(json.as_bytes()).unwrap()
}

#[test]
fn test_thumbnail_with_counts() {
    let enricher = enricher_with(&[("abc123", "thumb", 7, 350)]);
    let response = block_on(enricher.enrich(event("/images/abc123/thumb.jpg"), &logger()));

    assert_eq!(response.header(X_IMAGE_ID), Some("abc123"));
    assert_eq!(response.header(X_IMAGE_SIZE), Some("thumb"));
    assert_eq!(response.header(X_VIEWS), Some("7"));
    assert_eq!(response.header(X_PIXELS_VIEWED), Some("350"));
}

#[test]
fn test_counts_are_rendered_as_decimal() {
    let enricher = enricher_with(&[("img-9", "large", 42, 1000)]);
    let response = block_on(enricher.enrich(event("/images/img-9/large.webp"), &logger()));

    assert_eq!(response.header(X_VIEWS), Some("42"));
    assert_eq!(response.header(X_PIXELS_VIEWED), Some("1000"));
}

#[test]
fn test_non_variant_path_passes_through() {
    let enricher = enricher_with(&[("abc123", "thumb", 7, 350)]);
    let original = event("/favicon.ico");
    let (response, metrics) = block_on(enricher.enrich_observed(original.clone(), &logger()));

    assert_eq!(metrics.outcome, EnrichOutcome::Passthrough);
    assert_eq!(response, original.response);
}

#[test]
fn test_lookup_timeout_keeps_identity_headers_only() {
    let enricher = ResponseEnricher::new(CounterClient::new(FailingCounterStore::new(
        LookupError::Timeout(Duration::from_millis(100)),
    )));
    let (response, metrics) =
        block_on(enricher.enrich_observed(event("/images/abc123/thumb.jpg"), &logger()));

    assert_eq!(metrics.outcome, EnrichOutcome::LookupFailed);
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(X_IMAGE_ID), Some("abc123"));
    assert_eq!(response.header(X_IMAGE_SIZE), Some("thumb"));
    assert!(response.header(X_VIEWS).is_none());
    assert!(response.header(X_PIXELS_VIEWED).is_none());
}

#[test]
fn test_missing_record_keeps_identity_headers_only() {
    let enricher = enricher_with(&[("abc123", "thumb", 7, 350)]);
    let (response, metrics) =
        block_on(enricher.enrich_observed(event("/images/abc123/medium.png"), &logger()));

    assert_eq!(metrics.outcome, EnrichOutcome::NoRecord);
    assert_eq!(response.header(X_IMAGE_SIZE), Some("medium"));
    assert!(response.header(X_VIEWS).is_none());
    assert!(response.header(X_PIXELS_VIEWED).is_none());
}

#[test]
fn test_malformed_record_degrades_like_a_failed_lookup() {
    let store = MemoryCounterStore::new().with_raw(
        VariantKey::new("abc123", "thumb"),
        br#"{"views": -3}"#.to_vec(),
    );
    let enricher = ResponseEnricher::new(CounterClient::new(store));
    let (response, metrics) =
        block_on(enricher.enrich_observed(event("/images/abc123/thumb.jpg"), &logger()));

    assert_eq!(metrics.outcome, EnrichOutcome::LookupFailed);
    assert_eq!(metrics.lookup_error.as_deref(), Some("malformed"));
    assert_eq!(response.header(X_IMAGE_ID), Some("abc123"));
    assert!(response.header(X_VIEWS).is_none());
}

#[test]
fn test_zero_counts_are_still_written() {
    let enricher = enricher_with(&[("abc123", "thumb", 0, 0)]);
    let response = block_on(enricher.enrich(event("/images/abc123/thumb.jpg"), &logger()));

    assert_eq!(response.header(X_VIEWS), Some("0"));
    assert_eq!(response.header(X_PIXELS_VIEWED), Some("0"));
}

#[test]
fn test_status_body_and_other_headers_are_untouched() {
    let enricher = enricher_with(&[("abc123", "thumb", 7, 350)]);
    let original = event("/images/abc123/thumb.jpg");
    let response = block_on(enricher.enrich(original.clone(), &logger()));

    assert_eq!(response.status, original.response.status);
    assert_eq!(response.body, original.response.body);
    for (name, value) in original.response.headers.iter() {
        assert_eq!(response.headers.get(name), Some(value));
    }
    assert_eq!(response.headers.len(), original.response.headers.len() + 4);
}

#[test]
fn test_enriching_twice_changes_nothing() {
    let enricher = enricher_with(&[("abc123", "thumb", 7, 350)]);
    let once = block_on(enricher.enrich(event("/images/abc123/thumb.jpg"), &logger()));
    let twice = block_on(enricher.enrich(
        EdgeEvent::new(EdgeRequest::new("/images/abc123/thumb.jpg"), once.clone()),
        &logger(),
    ));

    assert_eq!(once, twice);
    assert_eq!(twice.headers.get_all(X_VIEWS).iter().count(), 1);
}

#[test]
fn test_unencodable_identity_returns_original_response() {
    let enricher = enricher_with(&[("abc123", "thumb", 7, 350)]);
    let original = event("/images/abc\u{7}123/thumb.jpg");
    let (response, metrics) = block_on(enricher.enrich_observed(original.clone(), &logger()));

    assert_eq!(metrics.outcome, EnrichOutcome::Ignored);
    assert_eq!(response, original.response);
}

#[test]
fn test_demo_thumbnail_event() {
    let (response, metrics) = block_on(demo_enricher().enrich_observed(
        demo_event(include_str!("../../../demos/events/01-thumb.json")),
        &logger(),
    ));

    assert_eq!(metrics.outcome, EnrichOutcome::Enriched);
    assert_eq!(response.header("content-type"), Some("image/jpeg"));
    assert_eq!(response.header(X_IMAGE_ID), Some("abc123"));
    assert_eq!(response.header(X_IMAGE_SIZE), Some("thumb"));
    assert_eq!(response.header(X_VIEWS), Some("7"));
    assert_eq!(response.header(X_PIXELS_VIEWED), Some("350"));
}

#[test]
fn test_demo_typed_number_attributes() {
    let (response, metrics) = block_on(demo_enricher().enrich_observed(
        demo_event(include_str!("../../../demos/events/02-large.json")),
        &logger(),
    ));

    assert_eq!(metrics.outcome, EnrichOutcome::Enriched);
    assert_eq!(response.header(X_IMAGE_SIZE), Some("large"));
    assert_eq!(response.header(X_VIEWS), Some("42"));
    assert_eq!(response.header(X_PIXELS_VIEWED), Some("1000"));
}

#[test]
fn test_demo_zero_views_defaults_missing_pixels() {
    let response = block_on(demo_enricher().enrich(
        demo_event(include_str!("../../../demos/events/03-zero-views.json")),
        &logger(),
    ));

    assert_eq!(response.header(X_IMAGE_ID), Some("f00d"));
    assert_eq!(response.header(X_VIEWS), Some("0"));
    assert_eq!(response.header(X_PIXELS_VIEWED), Some("0"));
}

#[test]
fn test_demo_no_record_and_favicon() {
    let (response, metrics) = block_on(demo_enricher().enrich_observed(
        demo_event(include_str!("../../../demos/events/04-no-record.json")),
        &logger(),
    ));
    assert_eq!(metrics.outcome, EnrichOutcome::NoRecord);
    assert!(response.header(X_IMAGE_ID).is_some());
    assert!(response.header(X_VIEWS).is_none());

    let favicon = demo_event(include_str!("../../../demos/events/05-favicon.json"));
    let (response, metrics) = block_on(demo_enricher().enrich_observed(favicon.clone(), &logger()));
    assert_eq!(metrics.outcome, EnrichOutcome::Passthrough);
    let EventPayload::Event(original) = favicon else {
        panic!("favicon request did not decode");
    };
    assert_eq!(response, original.response);
}

#[test]
fn test_malformed_event_returns_original_response() {
    let payload = demo_event(include_str!("../../../demos/events/06-malformed-request.json"));
    let EventPayload::MalformedRequest { response: original, .. } = payload.clone() else {
        panic!("non-string uri decoded as a request");
    };

    let (response, metrics) = block_on(demo_enricher().enrich_observed(payload, &logger()));

    assert_eq!(metrics.outcome, EnrichOutcome::Ignored);
    assert!(metrics.lookup_us.is_none());
    assert_eq!(response, original);
    assert_eq!(response.body, b"jpeg");
    assert_eq!(response.header("cache-control"), Some("max-age=86400"));
    assert!(response.header(X_IMAGE_ID).is_none());
}

#[test]
fn test_event_without_request_returns_original_response() {
    let payload = demo_event(
        r#"{"Records":[{"cf":{"response":{
            "status":"404",
            "headers":{"content-type":[{"key":"Content-Type","value":"text/plain"}]},
            "body":"not found"
        }}}]}"#,
    );

    let (response, metrics) = block_on(demo_enricher().enrich_observed(payload, &logger()));

    assert_eq!(metrics.outcome, EnrichOutcome::Ignored);
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, b"not found");
    assert_eq!(response.headers.len(), 1);
}

#[test]
fn test_non_utf8_header_bytes_survive_enrichment() {
    let disposition: &[u8] = b"inline; filename=\"caf\xe9.jpg\"";
    let mut original = event("/images/abc123/thumb.jpg");
    original.response.headers.insert(
        "content-disposition",
        HeaderValue::from_bytes(disposition).unwrap(),
    );

    for path in ["/images/abc123/thumb.jpg", "/favicon.ico"] {
        let mut event = original.clone();
        event.request = EdgeRequest::new(path);
        let response = block_on(
            ResponseEnricher::new(CounterClient::new(FailingCounterStore::new(
                LookupError::Timeout(Duration::from_millis(100)),
            )))
            .enrich(event, &logger()),
        );

        let value = response.headers.get("content-disposition").unwrap();
        assert_eq!(value.as_bytes(), disposition);
        assert!(value.as_bytes().contains(&0xe9));
    }
}
