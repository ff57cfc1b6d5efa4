//! Data-URI codec for inline media payloads.
//!
//! Generated images travel as `data:<mime>;base64,<payload>` strings, the
//! same shape the provider's inline parts use. Video generation decodes
//! the stored image back into raw bytes for the upload.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::CoreError;

/// Fallback MIME type when a data URI omits one.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Decoded media payload: MIME type plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Encode raw bytes as a base64 data URI.
pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}

/// Decode a base64 data URI into its MIME type and raw bytes.
///
/// A missing MIME type falls back to [`DEFAULT_IMAGE_MIME`]; anything
/// else malformed is an [`CoreError::InvalidMedia`].
pub fn decode_data_uri(uri: &str) -> Result<MediaPayload, CoreError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| CoreError::InvalidMedia("missing data: prefix".into()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CoreError::InvalidMedia("missing payload separator".into()))?;

    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| CoreError::InvalidMedia("only base64 data URIs are supported".into()))?;

    let mime_type = if mime.is_empty() {
        DEFAULT_IMAGE_MIME.to_string()
    } else {
        mime.to_string()
    };

    let bytes = BASE64
        .decode(payload)
        .map_err(|e| CoreError::InvalidMedia(format!("invalid base64 payload: {e}")))?;

    Ok(MediaPayload { mime_type, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_bytes_and_mime() {
        let bytes = vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a];
        let uri = encode_data_uri("image/png", &bytes);
        assert!(uri.starts_with("data:image/png;base64,"));

        let payload = decode_data_uri(&uri).unwrap();
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.bytes, bytes);
    }

    #[test]
    fn missing_mime_falls_back_to_png() {
        let payload = decode_data_uri("data:;base64,aGVsbG8=").unwrap();
        assert_eq!(payload.mime_type, DEFAULT_IMAGE_MIME);
        assert_eq!(payload.bytes, b"hello");
    }

    #[test]
    fn rejects_non_data_uri() {
        assert!(decode_data_uri("https://example.com/image.png").is_err());
    }

    #[test]
    fn rejects_missing_separator() {
        assert!(decode_data_uri("data:image/png;base64").is_err());
    }

    #[test]
    fn rejects_non_base64_encoding() {
        assert!(decode_data_uri("data:image/png,rawdata").is_err());
    }

    #[test]
    fn rejects_invalid_base64_payload() {
        assert!(decode_data_uri("data:image/png;base64,@@not-base64@@").is_err());
    }

    #[test]
    fn jpeg_mime_survives_round_trip() {
        let uri = encode_data_uri("image/jpeg", b"\xff\xd8\xff");
        let payload = decode_data_uri(&uri).unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
    }
}
