//! The in-flight request/response pair of one edge invocation.

use http::{HeaderMap, StatusCode};

/// The inbound request, as far as the edge function cares about it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeRequest {
    /// Request URI path (no query string).
    pub uri: String,
}

impl EdgeRequest {
    /// Create a request for a path.
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// The outbound response on its way to the client.
///
/// Only `headers` may be touched by enrichment; `status` and `body` are
/// carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Vec<u8>,
}

impl EdgeResponse {
    /// Create a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Create an empty `200 OK` response.
    pub fn ok() -> Self {
        Self::new(StatusCode::OK, Vec::new())
    }

    /// Get a header value as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Header names and raw value bytes, in map order.
    pub fn header_pairs(&self) -> impl Iterator<Item = (&str, &[u8])> + '_ {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_bytes()))
    }
}

impl Default for EdgeResponse {
    fn default() -> Self {
        Self::ok()
    }
}

/// One edge invocation: the request that triggered it and the response
/// being delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeEvent {
    /// The inbound request.
    pub request: EdgeRequest,
    /// The outbound response.
    pub response: EdgeResponse,
}

impl EdgeEvent {
    /// Create an event.
    pub fn new(request: EdgeRequest, response: EdgeResponse) -> Self {
        Self { request, response }
    }

    /// Path of the inbound request.
    pub fn path(&self) -> &str {
        &self.request.uri
    }
}
