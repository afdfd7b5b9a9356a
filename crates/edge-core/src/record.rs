//! CDN event record wire shape.
//!
//! Edge events arrive as JSON of the form
//! `{"Records":[{"cf":{"request":{..},"response":{..}}}]}`, where response
//! headers map a lowercase name to a list of `{key, value}` records.
//!
//! Decoding happens in two stages. The response is decoded first; a record
//! without a deliverable response is an `EventError`. The request part is
//! decoded second, and a malformed request still yields the response.

use std::collections::BTreeMap;

use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::event::{EdgeEvent, EdgeRequest, EdgeResponse};

/// Errors decoding an event record.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Event has no records")]
    MissingRecord,

    #[error("Event record has no request")]
    MissingRequest,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Event record has no response")]
    MissingResponse,

    #[error("Invalid response status: {0}")]
    InvalidStatus(String),

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),
}

/// Top-level event envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "Records", default)]
    pub records: Vec<RecordEntry>,
}

/// One entry of the `Records` array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordEntry {
    #[serde(default)]
    pub cf: CfPayload,
}

/// The `cf` payload carrying the request/response pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CfPayload {
    /// Raw request JSON, decoded only after the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseRecord>,
}

/// Request fields of interest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub uri: String,
}

/// Response as carried in the event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Status code as a decimal string (e.g. `"200"`).
    pub status: String,
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<HeaderRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// A single header value record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRecord {
    pub key: String,
    pub value: String,
}

/// A decoded event record.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Request and response both decoded.
    Event(EdgeEvent),
    /// The response decoded but the request part did not.
    ///
    /// The response must be delivered exactly as it arrived.
    MalformedRequest {
        response: EdgeResponse,
        reason: String,
    },
}

impl EventPayload {
    /// Decode a payload from CDN event record JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self, EventError> {
        EventRecord::from_json(bytes)?.into_payload()
    }

    /// Request path, if the request decoded.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Event(event) => Some(event.path()),
            Self::MalformedRequest { .. } => None,
        }
    }
}

impl From<EdgeEvent> for EventPayload {
    fn from(event: EdgeEvent) -> Self {
        Self::Event(event)
    }
}

impl EventRecord {
    /// Decode an event record from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, EventError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Build a single-record envelope from an event.
    pub fn from_event(event: &EdgeEvent) -> Self {
        Self::with_parts(
            Some(RequestRecord {
                uri: event.request.uri.clone(),
            }),
            &event.response,
        )
    }

    /// Build a single-record envelope, with or without a request part.
    pub fn with_parts(request: Option<RequestRecord>, response: &EdgeResponse) -> Self {
        Self {
            records: vec![RecordEntry {
                cf: CfPayload {
                    request: request.and_then(|r| serde_json::to_value(r).ok()),
                    response: Some(ResponseRecord::from_response(response)),
                },
            }],
        }
    }

    /// Decode the first record.
    ///
    /// Fails only when there is no response to deliver.
    pub fn into_payload(self) -> Result<EventPayload, EventError> {
        let entry = self
            .records
            .into_iter()
            .next()
            .ok_or(EventError::MissingRecord)?;
        let response = entry
            .cf
            .response
            .ok_or(EventError::MissingResponse)?
            .to_response()?;

        Ok(match RequestRecord::decode(entry.cf.request) {
            Ok(request) => EventPayload::Event(EdgeEvent::new(
                EdgeRequest::new(request.uri),
                response,
            )),
            Err(err) => EventPayload::MalformedRequest {
                response,
                reason: err.to_string(),
            },
        })
    }
}

impl RequestRecord {
    /// Decode the raw request part; `uri` must be a string.
    pub fn decode(value: Option<serde_json::Value>) -> Result<Self, EventError> {
        let value = value.ok_or(EventError::MissingRequest)?;
        serde_json::from_value(value).map_err(|e| EventError::InvalidRequest(e.to_string()))
    }
}

impl ResponseRecord {
    /// Encode a response into its record shape.
    ///
    /// JSON strings cannot carry raw bytes, so non-UTF-8 header values and
    /// bodies are rendered lossily here. Only the record is affected.
    pub fn from_response(response: &EdgeResponse) -> Self {
        let mut headers: BTreeMap<String, Vec<HeaderRecord>> = BTreeMap::new();
        for (name, value) in response.header_pairs() {
            headers
                .entry(name.to_string())
                .or_default()
                .push(HeaderRecord {
                    key: name.to_string(),
                    value: String::from_utf8_lossy(value).into_owned(),
                });
        }

        let body = if response.body.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&response.body).into_owned())
        };

        Self {
            status: response.status.as_u16().to_string(),
            headers,
            body,
        }
    }

    /// Decode into a response.
    pub fn to_response(&self) -> Result<EdgeResponse, EventError> {
        let status = self
            .status
            .trim()
            .parse::<u16>()
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .ok_or_else(|| EventError::InvalidStatus(self.status.clone()))?;

        let mut response = EdgeResponse::new(
            status,
            self.body.clone().map(String::into_bytes).unwrap_or_default(),
        );

        for (name, values) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| EventError::InvalidHeader(name.clone()))?;
            for record in values {
                let value = HeaderValue::from_str(&record.value)
                    .map_err(|_| EventError::InvalidHeader(name.clone()))?;
                response.headers.append(header_name.clone(), value);
            }
        }

        Ok(response)
    }
}
