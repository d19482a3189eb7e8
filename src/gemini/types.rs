use serde::{Deserialize, Serialize};

use crate::models::{GenerationSettings, InlineImage, ResponseModality, SafetySetting};

use super::GenerationRequest;

/// One unit of a message: plain text or an inline image.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "inline_data")]
    pub inline_data: Option<InlineImage>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn image(image: InlineImage) -> Self {
        Self {
            text: None,
            inline_data: Some(image),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub response_modalities: Vec<ResponseModality>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerateContentRequest {
    /// Prompt first, then the images in the order given.
    pub fn new(request: &GenerationRequest, settings: &GenerationSettings) -> Self {
        let mut parts = Vec::with_capacity(request.images.len() + 1);
        parts.push(Part::text(request.prompt.clone()));
        parts.extend(request.images.iter().cloned().map(Part::image));

        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                max_output_tokens: settings.max_output_tokens,
                temperature: settings.temperature,
                top_p: settings.top_p,
                response_modalities: settings.response_modalities.clone(),
            },
            safety_settings: settings.safety_settings.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// One streamed chunk of a `streamGenerateContent` response.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseChunk {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

impl ResponseChunk {
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content { role: None, parts }),
                finish_reason: None,
            }],
            error: None,
        }
    }

    /// Every part of every candidate, in stream order.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
    }
}
