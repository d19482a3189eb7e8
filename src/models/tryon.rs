use serde::{Deserialize, Serialize};

use super::image::EncodedImage;

/// JSON body of a successful `POST /api/generate-try-on`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TryOnSuccess {
    pub success: bool,
    pub image_data: String,
    pub mime_type: String,
}

impl From<EncodedImage> for TryOnSuccess {
    fn from(image: EncodedImage) -> Self {
        Self {
            success: true,
            image_data: image.data,
            mime_type: image.mime_type,
        }
    }
}

/// JSON body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Lenient view of the relay response used by clients: every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TryOnResponse {
    #[serde(default)]
    pub success: bool,
    pub image_data: Option<String>,
    pub mime_type: Option<String>,
    pub error: Option<String>,
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_body_shape() {
        let body = TryOnSuccess::from(EncodedImage::new("AAAA", Some("image/png".into())));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"success": true, "imageData": "AAAA", "mimeType": "image/png"})
        );
    }

    #[test]
    fn error_body_omits_missing_details() {
        let body = ErrorBody {
            error: "nope".into(),
            details: None,
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"error": "nope"}));
    }

    #[test]
    fn lenient_response_parses_error_only() {
        let parsed: TryOnResponse = serde_json::from_str(r#"{"error":"bad"}"#).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.error.as_deref(), Some("bad"));
        assert!(parsed.image_data.is_none());
    }
}
