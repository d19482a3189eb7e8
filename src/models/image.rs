use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TryOnError};

use super::common::{DEFAULT_IMAGE_MIME, FALLBACK_UPLOAD_MIME};

/// A raw image buffer tagged with its content type.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let content_type = content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_UPLOAD_MIME.to_string());

        Self {
            file_name: file_name.into(),
            content_type,
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Encode the buffer as an inline base64 payload.
    pub fn to_inline(&self) -> InlineImage {
        InlineImage {
            mime_type: self.content_type.clone(),
            data: BASE64.encode(&self.data),
        }
    }
}

/// Base64 image data paired with its content type, as sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    #[serde(default, alias = "mime_type")]
    pub mime_type: String,
    pub data: String,
}

/// The two images of one try-on request. The user photo always goes first.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub user_image: ImageUpload,
    pub product_image: ImageUpload,
}

/// An image ready for display: base64 data plus content type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncodedImage {
    pub data: String,
    pub mime_type: String,
}

impl EncodedImage {
    pub fn new(data: impl Into<String>, mime_type: Option<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string()),
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| TryOnError::ResponseError(format!("invalid base64 image: {}", e)))
    }

    /// File extension matching the content type, for saving results.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// Outcome of one try-on request: exactly one of image or error.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    Image(EncodedImage),
    Error(String),
}

impl GenerationResult {
    pub fn image(&self) -> Option<&EncodedImage> {
        match self {
            GenerationResult::Image(image) => Some(image),
            GenerationResult::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            GenerationResult::Image(_) => None,
            GenerationResult::Error(msg) => Some(msg),
        }
    }
}

/// Remove a leading `data:image/<subtype>;base64,` prefix, if any.
pub fn strip_data_uri_prefix(data: &str) -> &str {
    const MARKER: &str = ";base64,";

    let Some(rest) = data.strip_prefix("data:image/") else {
        return data;
    };
    match rest.find(MARKER) {
        Some(idx)
            if idx > 0 && rest[..idx].bytes().all(|b| b.is_ascii_lowercase()) =>
        {
            &rest[idx + MARKER.len()..]
        }
        _ => data,
    }
}

/// Guess a content type from a file name, used for local photos.
pub fn mime_for_path(path: &std::path::Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_data_uri_prefix() {
        assert_eq!(strip_data_uri_prefix("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_uri_prefix("data:image/jpeg;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_uri_prefix("AAAA"), "AAAA");
        // only lowercase subtypes are treated as a prefix
        assert_eq!(
            strip_data_uri_prefix("data:image/svg+xml;base64,AAAA"),
            "data:image/svg+xml;base64,AAAA"
        );
        assert_eq!(
            strip_data_uri_prefix("data:text/plain;base64,AAAA"),
            "data:text/plain;base64,AAAA"
        );
    }

    #[test]
    fn upload_without_content_type_falls_back() {
        let upload = ImageUpload::new("photo", None, vec![1u8, 2, 3]);
        assert_eq!(upload.content_type, FALLBACK_UPLOAD_MIME);
        assert_eq!(upload.to_inline().data, "AQID");
    }

    #[test]
    fn encoded_image_defaults_and_data_uri() {
        let image = EncodedImage::new("AQID", None);
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.to_data_uri(), "data:image/png;base64,AQID");
        assert_eq!(image.decode().unwrap(), vec![1, 2, 3]);
        assert_eq!(image.extension(), "png");
    }

    #[test]
    fn generation_result_is_one_or_the_other() {
        let ok = GenerationResult::Image(EncodedImage::new("AQID", None));
        assert!(ok.image().is_some() && ok.error().is_none());

        let err = GenerationResult::Error("boom".into());
        assert!(err.image().is_none());
        assert_eq!(err.error(), Some("boom"));
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for_path("me.JPG".as_ref()), Some("image/jpeg"));
        assert_eq!(mime_for_path("me.png".as_ref()), Some("image/png"));
        assert_eq!(mime_for_path("me".as_ref()), None);
    }
}
