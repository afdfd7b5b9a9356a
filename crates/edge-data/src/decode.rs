//! Typed decoding of stored counter records.
//!
//! The counting process writes each record as a JSON object with optional
//! `views` and `pixelsViewed` fields. A field may be an integer, a decimal
//! string, or a typed attribute `{"N": "42"}`; a missing field counts as 0.

use edge_core::CounterRecord;
use serde::Deserialize;

use crate::error::LookupError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CounterValue {
    Integer(u64),
    Text(String),
    Attribute {
        #[serde(rename = "N")]
        n: String,
    },
}

impl CounterValue {
    fn into_u64(self, field: &str) -> Result<u64, LookupError> {
        let text = match self {
            Self::Integer(n) => return Ok(n),
            Self::Text(s) | Self::Attribute { n: s } => s,
        };
        text.trim().parse().map_err(|_| {
            LookupError::Malformed(format!("{} is not a non-negative integer: {:?}", field, text))
        })
    }
}

#[derive(Debug, Deserialize)]
struct StoredRecord {
    #[serde(default)]
    views: Option<CounterValue>,
    #[serde(default, rename = "pixelsViewed")]
    pixels_viewed: Option<CounterValue>,
}

fn field(value: Option<CounterValue>, name: &str) -> Result<u64, LookupError> {
    value.map_or(Ok(0), |v| v.into_u64(name))
}

/// Decode a stored record.
pub fn decode_record(bytes: &[u8]) -> Result<CounterRecord, LookupError> {
    let stored: StoredRecord =
        serde_json::from_slice(bytes).map_err(|e| LookupError::Malformed(e.to_string()))?;

    Ok(CounterRecord {
        views: field(stored.views, "views")?,
        pixels_viewed: field(stored.pixels_viewed, "pixelsViewed")?,
    })
}

/// Encode a record the way the counting process stores it.
pub fn encode_record(record: &CounterRecord) -> Vec<u8> {
    serde_json::json!({
        "views": record.views,
        "pixelsViewed": record.pixels_viewed,
    })
    .to_string()
    .into_bytes()
}
