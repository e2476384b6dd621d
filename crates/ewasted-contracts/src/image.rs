use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUrlError {
    #[error("data URL does not carry an image")]
    NotAnImage,
    #[error("malformed image data URL")]
    Malformed,
    #[error("image payload is not valid base64")]
    InvalidBase64,
}

/// An image as the model API takes it: MIME type plus base64 payload.
///
/// Built from a data URL or raw bytes; a data URL itself is never forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    mime_type: String,
    data: String,
}

impl InlineImage {
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Result<Self, DataUrlError> {
        let mime_type = mime_type.trim();
        if !is_image_mime(mime_type) {
            return Err(DataUrlError::NotAnImage);
        }
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: BASE64.encode(bytes),
        })
    }

    pub fn from_data_url(raw: &str) -> Result<Self, DataUrlError> {
        let raw = raw.trim();
        let Some(rest) = raw.strip_prefix("data:image/") else {
            return Err(DataUrlError::NotAnImage);
        };
        let (meta, payload) = rest.split_once(',').ok_or(DataUrlError::Malformed)?;
        let subtype = meta
            .strip_suffix(";base64")
            .ok_or(DataUrlError::Malformed)?;
        let mime_type = format!("image/{subtype}");
        if !is_image_mime(&mime_type) {
            return Err(DataUrlError::Malformed);
        }
        if payload.is_empty() || BASE64.decode(payload.as_bytes()).is_err() {
            return Err(DataUrlError::InvalidBase64);
        }
        Ok(Self {
            mime_type,
            data: payload.to_string(),
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 payload without any data URL prefix.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

fn is_image_mime(mime_type: &str) -> bool {
    let Some(subtype) = mime_type.strip_prefix("image/") else {
        return false;
    };
    !subtype.is_empty()
        && subtype
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.' | '+'))
}

#[cfg(test)]
mod tests {
    use super::{DataUrlError, InlineImage};

    #[test]
    fn splits_data_url_into_mime_and_payload() -> anyhow::Result<()> {
        let image = InlineImage::from_data_url("data:image/svg+xml;base64,PHN2Zy8+")?;
        assert_eq!(image.mime_type(), "image/svg+xml");
        assert_eq!(image.data(), "PHN2Zy8+");
        assert_eq!(image.to_data_url(), "data:image/svg+xml;base64,PHN2Zy8+");
        Ok(())
    }

    #[test]
    fn rejects_non_image_data_urls() {
        assert_eq!(
            InlineImage::from_data_url("data:application/pdf;base64,JVBERi0="),
            Err(DataUrlError::NotAnImage)
        );
        assert_eq!(
            InlineImage::from_data_url("hello"),
            Err(DataUrlError::NotAnImage)
        );
    }

    #[test]
    fn rejects_malformed_and_undecodable_payloads() {
        assert_eq!(
            InlineImage::from_data_url("data:image/png,iVBORw0KGgo="),
            Err(DataUrlError::Malformed)
        );
        assert_eq!(
            InlineImage::from_data_url("data:image/p ng;base64,iVBORw0KGgo="),
            Err(DataUrlError::Malformed)
        );
        assert_eq!(
            InlineImage::from_data_url("data:image/png;base64,***"),
            Err(DataUrlError::InvalidBase64)
        );
        assert_eq!(
            InlineImage::from_data_url("data:image/png;base64,"),
            Err(DataUrlError::InvalidBase64)
        );
    }

    #[test]
    fn from_bytes_round_trips_through_data_url() -> anyhow::Result<()> {
        let image = InlineImage::from_bytes(&[0x89, b'P', b'N', b'G'], "image/png")?;
        let parsed = InlineImage::from_data_url(&image.to_data_url())?;
        assert_eq!(parsed, image);
        assert_eq!(
            InlineImage::from_bytes(b"text", "text/plain"),
            Err(DataUrlError::NotAnImage)
        );
        Ok(())
    }
}
