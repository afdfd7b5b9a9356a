//! Conversions between proxied HTTP messages and edge events.
//!
//! Header values are carried as raw bytes in both directions, and repeated
//! headers keep every value in order.

use http::header::{HeaderMap, HeaderName, HOST};

use crate::event::EdgeResponse;

/// Connection-level headers the host manages itself.
pub const HOP_BY_HOP: [&str; 4] = ["connection", "keep-alive", "transfer-encoding", "upgrade"];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Client request headers to send on to the origin.
///
/// Everything except hop-by-hop headers and `host`, which belongs to the
/// origin URL.
pub fn forward_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name) || *name == HOST {
            continue;
        }
        forwarded.append(name.clone(), value.clone());
    }
    forwarded
}

/// Origin URL for a request path and query.
pub fn origin_url(origin: &str, path: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{}{}?{}", origin, path, query),
        _ => format!("{}{}", origin, path),
    }
}

impl EdgeResponse {
    /// Take an origin response as the response to deliver.
    ///
    /// Status, body and header bytes are kept; only hop-by-hop headers are
    /// dropped.
    pub fn from_http(response: http::Response<Vec<u8>>) -> Self {
        let (parts, body) = response.into_parts();

        let mut headers = HeaderMap::with_capacity(parts.headers.len());
        for (name, value) in &parts.headers {
            if !is_hop_by_hop(name) {
                headers.append(name.clone(), value.clone());
            }
        }

        Self {
            status: parts.status,
            headers,
            body,
        }
    }

    /// Convert into an HTTP response for the client.
    pub fn into_http(self) -> http::Response<Vec<u8>> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
