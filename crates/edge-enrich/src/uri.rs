//! Variant URL parsing.

use edge_core::VariantKey;

/// First path segment of every variant URL.
pub const IMAGES_PREFIX: &str = "images";

/// Extract the variant key from a path of the form `/images/{imageId}/{size}.{ext}`.
///
/// Empty segments are ignored, so `//images/a//thumb.jpg` parses like the
/// canonical form. Segments past the third are ignored. Anything else is not
/// a variant URL and yields `None`.
pub fn parse_variant_path(path: &str) -> Option<VariantKey> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());

    if segments.next()? != IMAGES_PREFIX {
        return None;
    }
    let image_id = segments.next()?;
    let file = segments.next()?;

    // "thumb.jpg" -> "thumb"; "thumb" -> "thumb"; ".jpg" -> no variant
    let size = file.split('.').next().unwrap_or(file);
    if size.is_empty() {
        return None;
    }

    Some(VariantKey::new(image_id, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(path: &str) -> Option<(String, String)> {
        parse_variant_path(path).map(|k| (k.image_id().to_string(), k.size().to_string()))
    }

    fn pair(id: &str, size: &str) -> Option<(String, String)> {
        Some((id.to_string(), size.to_string()))
    }

    #[test]
    fn test_canonical_path() {
        assert_eq!(parsed("/images/abc123/thumb.jpg"), pair("abc123", "thumb"));
    }

    #[test]
    fn test_size_stops_at_first_dot() {
        assert_eq!(parsed("/images/abc123/medium.v2.webp"), pair("abc123", "medium"));
    }

    #[test]
    fn test_size_without_extension() {
        assert_eq!(parsed("/images/abc123/large"), pair("abc123", "large"));
    }

    #[test]
    fn test_image_id_is_verbatim() {
        assert_eq!(parsed("/images/ABC-123_x.y/thumb.png"), pair("ABC-123_x.y", "thumb"));
    }

    #[test]
    fn test_empty_segments_are_ignored() {
        assert_eq!(parsed("//images//abc123///thumb.jpg"), pair("abc123", "thumb"));
        assert_eq!(parsed("images/abc123/thumb.jpg"), pair("abc123", "thumb"));
    }

    #[test]
    fn test_extra_segments_are_ignored() {
        assert_eq!(parsed("/images/abc123/thumb.jpg/extra"), pair("abc123", "thumb"));
    }

    #[test]
    fn test_not_variant_urls() {
        for path in [
            "",
            "/",
            "/favicon.ico",
            "/health",
            "/images",
            "/images/abc123",
            "/images/abc123/",
            "/media/abc123/thumb.jpg",
            "/Images/abc123/thumb.jpg",
            "/images/abc123/.jpg",
        ] {
            assert_eq!(parse_variant_path(path), None, "path {:?}", path);
        }
    }
}
