//! Variant metadata headers.

use edge_core::{CounterRecord, VariantKey};
use http::header::{HeaderMap, HeaderName, HeaderValue};

/// Header names written onto variant responses.
pub mod header_names {
    /// Image identifier parsed from the path.
    pub const X_IMAGE_ID: &str = "x-image-id";
    /// Variant name parsed from the path.
    pub const X_IMAGE_SIZE: &str = "x-image-size";
    /// Stored view count.
    pub const X_VIEWS: &str = "x-views";
    /// Stored pixels-viewed count.
    pub const X_PIXELS_VIEWED: &str = "x-pixels-viewed";
}

/// A value from the request path that cannot be sent as a header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{header}' value is not a valid header value: {value:?}")]
pub struct InvalidHeader {
    /// Header that would have carried the value.
    pub header: &'static str,
    /// The rejected value.
    pub value: String,
}

/// Headers describing one variant response.
///
/// Identity headers are always present; counter headers only when a
/// record was found (a zero count is still written).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantHeaders {
    image_id: HeaderValue,
    size: HeaderValue,
    counters: Option<CounterRecord>,
}

impl VariantHeaders {
    /// Build the identity headers for a variant.
    ///
    /// Fails if the path-derived values contain bytes a header cannot carry.
    pub fn for_variant(key: &VariantKey) -> Result<Self, InvalidHeader> {
        Ok(Self {
            image_id: header_value(header_names::X_IMAGE_ID, key.image_id())?,
            size: header_value(header_names::X_IMAGE_SIZE, key.size())?,
            counters: None,
        })
    }

    /// Attach counter values.
    pub fn with_counters(mut self, record: CounterRecord) -> Self {
        self.counters = Some(record);
        self
    }

    /// Header pairs in write order.
    pub fn to_pairs(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut pairs = vec![
            (
                HeaderName::from_static(header_names::X_IMAGE_ID),
                self.image_id.clone(),
            ),
            (
                HeaderName::from_static(header_names::X_IMAGE_SIZE),
                self.size.clone(),
            ),
        ];

        if let Some(record) = self.counters {
            pairs.push((
                HeaderName::from_static(header_names::X_VIEWS),
                HeaderValue::from(record.views),
            ));
            pairs.push((
                HeaderName::from_static(header_names::X_PIXELS_VIEWED),
                HeaderValue::from(record.pixels_viewed),
            ));
        }

        pairs
    }

    /// Write onto a header map, replacing any existing values of these names.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in self.to_pairs() {
            headers.insert(name, value);
        }
    }
}

fn header_value(header: &'static str, value: &str) -> Result<HeaderValue, InvalidHeader> {
    HeaderValue::from_str(value).map_err(|_| InvalidHeader {
        header,
        value: value.to_string(),
    })
}
