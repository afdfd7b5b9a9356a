//! Variant identity and counter values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one resized rendition of an uploaded image.
///
/// Derived from a request path such as `/images/abc123/thumb.jpg` and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    image_id: String,
    size: String,
}

impl VariantKey {
    /// Create a variant key.
    pub fn new(image_id: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            size: size.into(),
        }
    }

    /// The image identifier, verbatim from the path.
    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    /// The variant name (e.g. `thumb`).
    pub fn size(&self) -> &str {
        &self.size
    }

    /// Key of this variant's counter record in a namespaced store.
    pub fn store_key(&self, prefix: &str) -> String {
        format!("{}:{}:{}", prefix, self.image_id, self.size)
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.image_id, self.size)
    }
}

/// View counters of a single variant.
///
/// Written by the counting process; only ever read at the edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRecord {
    /// Number of times the variant was served.
    pub views: u64,
    /// Total pixels delivered for the variant.
    pub pixels_viewed: u64,
}

impl CounterRecord {
    /// Create a counter record.
    pub fn new(views: u64, pixels_viewed: u64) -> Self {
        Self {
            views,
            pixels_viewed,
        }
    }
}
