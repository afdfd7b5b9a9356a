//! Edge component adding view counts to image variant responses.
//!
//! Proxies each request to the configured origin, then runs the response
//! through the enricher:
//! - `x-image-id` / `x-image-size` from `/images/{id}/{size}.{ext}`
//! - `x-views` / `x-pixels-viewed` from the counter store, when available
//!
//! Client request headers are forwarded to the origin, minus hop-by-hop
//! headers and `host`. Status, body and header bytes from the origin are
//! returned unchanged apart from the added headers.

use std::sync::OnceLock;

use http::StatusCode;

use spin_sdk::http::IntoResponse;
use spin_sdk::http_component;

use edge_sdk::edge_core::{
    forward_request_headers, origin_url, variable_names, ConfigError, EdgeEvent, EdgeRequest,
    EdgeResponse, EnricherConfig, RequestId,
};
use edge_sdk::edge_data::KvCounterStore;
use edge_sdk::edge_enrich::ResponseEnricher;
use edge_sdk::edge_observability::StructuredLogger;

const COMPONENT: &str = "view-counter";

/// Process-wide state, built on the first request and never mutated.
struct App {
    config: EnricherConfig,
    origin: String,
    enricher: ResponseEnricher<KvCounterStore>,
}

impl App {
    fn load() -> Result<Self, ConfigError> {
        let config = EnricherConfig::resolve(|name| spin_sdk::variables::get(name).ok())?;
        let origin = config.require_origin()?.to_string();
        let store = KvCounterStore::new(&config.counter_store, &config.counter_key_prefix);
        let enricher = ResponseEnricher::from_config(store, &config);

        Ok(Self {
            config,
            origin,
            enricher,
        })
    }
}

static APP: OnceLock<Result<App, ConfigError>> = OnceLock::new();

fn app() -> Result<&'static App, &'static ConfigError> {
    APP.get_or_init(App::load).as_ref()
}

/// Main HTTP handler.
#[http_component]
async fn handle(req: http::Request<Vec<u8>>) -> anyhow::Result<impl IntoResponse> {
    let request_id = RequestId::generate();

    let app = match app() {
        Ok(app) => app,
        Err(err) => {
            StructuredLogger::new(request_id)
                .with_component(COMPONENT)
                .error_builder("Configuration invalid")
                .field("error", err.to_string())
                .field("variables", variable_names::ALL.join(","))
                .emit();
            return Ok(plain(StatusCode::INTERNAL_SERVER_ERROR, "configuration error"));
        }
    };

    let path = req.uri().path().to_string();
    let logger = StructuredLogger::from_config(request_id, &app.config)
        .with_component(COMPONENT)
        .with_path(&path);

    let url = origin_url(&app.origin, &path, req.uri().query());
    let (parts, body) = req.into_parts();
    let mut origin_req = http::Request::new(body);
    *origin_req.method_mut() = parts.method;
    *origin_req.headers_mut() = forward_request_headers(&parts.headers);
    *origin_req.uri_mut() = match url.parse::<http::Uri>() {
        Ok(uri) => uri,
        Err(err) => {
            logger
                .error_builder("Origin URL invalid")
                .field("url", url)
                .field("error", err.to_string())
                .emit();
            return Ok(plain(StatusCode::BAD_GATEWAY, "bad gateway"));
        }
    };

    let origin_resp: http::Response<Vec<u8>> = match spin_sdk::http::send(origin_req).await {
        Ok(resp) => resp,
        Err(err) => {
            logger
                .error_builder("Origin request failed")
                .field("url", url)
                .field("error", err.to_string())
                .emit();
            return Ok(plain(StatusCode::BAD_GATEWAY, "bad gateway"));
        }
    };

    let event = EdgeEvent::new(EdgeRequest::new(path), EdgeResponse::from_http(origin_resp));
    let response = app.enricher.enrich(event, &logger).await;

    Ok(response.into_http())
}

fn plain(status: StatusCode, body: &str) -> http::Response<Vec<u8>> {
    let mut response = http::Response::new(body.as_bytes().to_vec());
    *response.status_mut() = status;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("text/plain"),
    );
    response
}
