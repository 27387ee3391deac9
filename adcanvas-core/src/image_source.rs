//! Image source references held in image layer content.
//!
//! Supports plain URLs/paths and base64-encoded data URIs such as
//! `data:image/png;base64,iVBORw0KGgo...`.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{CanvasError, CanvasResult};

/// A classified image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A URL or path resolved by the host.
    Url(String),
    /// An inline payload.
    Inline {
        /// MIME type from the data URI header.
        mime: String,
        /// Base64 payload, still encoded.
        payload: String,
    },
}

impl ImageSource {
    /// Classify a content string.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidImage`] for an empty reference or a data
    /// URI without a base64 payload section.
    pub fn parse(content: &str) -> CanvasResult<Self> {
        let content = content.trim();
        if content.is_empty() {
            return Err(CanvasError::InvalidImage("empty image reference".into()));
        }
        let Some(rest) = content.strip_prefix("data:") else {
            return Ok(Self::Url(content.to_string()));
        };
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CanvasError::InvalidImage("data URI has no payload".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| CanvasError::InvalidImage("data URI is not base64 encoded".into()))?;
        Ok(Self::Inline {
            mime: if mime.is_empty() {
                "application/octet-stream".to_string()
            } else {
                mime.to_string()
            },
            payload: payload.to_string(),
        })
    }

    /// Whether the source is an inline payload.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }

    /// Decode an inline payload. URLs yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidImage`] if the payload is not valid base64
    /// or decodes to nothing.
    pub fn decode(&self) -> CanvasResult<Option<Vec<u8>>> {
        match self {
            Self::Url(_) => Ok(None),
            Self::Inline { payload, .. } => {
                let bytes = STANDARD
                    .decode(payload.trim())
                    .map_err(|e| CanvasError::InvalidImage(format!("bad base64 payload: {e}")))?;
                if bytes.is_empty() {
                    return Err(CanvasError::InvalidImage("empty image payload".into()));
                }
                Ok(Some(bytes))
            }
        }
    }

    /// Build a data URI from raw bytes.
    #[must_use]
    pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }
}

/// Check that a content string is a usable image reference.
///
/// # Errors
///
/// Returns [`CanvasError::InvalidImage`] when the reference is empty or its
/// inline payload cannot be decoded.
pub fn validate_image_reference(content: &str) -> CanvasResult<()> {
    ImageSource::parse(content)?.decode().map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_passthrough() {
        let src = ImageSource::parse("https://cdn.example.com/hero.png").expect("parse");
        assert_eq!(src, ImageSource::Url("https://cdn.example.com/hero.png".into()));
        assert_eq!(src.decode().expect("decode"), None);
    }

    #[test]
    fn test_inline_roundtrip() {
        let uri = ImageSource::data_uri("image/png", &[0x89, 0x50, 0x4E, 0x47]);
        let src = ImageSource::parse(&uri).expect("parse");
        assert!(src.is_inline());
        let bytes = src.decode().expect("decode").expect("bytes");
        assert_eq!(bytes, vec![0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_invalid_payload_is_rejected() {
        assert!(validate_image_reference("data:image/png;base64,***").is_err());
        assert!(validate_image_reference("data:image/png,rawdata").is_err());
        assert!(validate_image_reference("   ").is_err());
        assert!(validate_image_reference("/assets/bg.jpg").is_ok());
    }
}
