use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_MIME: &str = "image/png";
pub const FALLBACK_UPLOAD_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmThreshold {
    Off,
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmThreshold,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseModality {
    Text,
    Image,
}

/// Sampling and safety parameters of one generation session.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub response_modalities: Vec<ResponseModality>,
    pub safety_settings: Vec<SafetySetting>,
}

impl Default for GenerationSettings {
    // Real photos of people trip the default filters, so every category is relaxed.
    fn default() -> Self {
        let safety_settings = [
            HarmCategory::HateSpeech,
            HarmCategory::DangerousContent,
            HarmCategory::SexuallyExplicit,
            HarmCategory::Harassment,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: HarmThreshold::Off,
        })
        .collect();

        GenerationSettings {
            max_output_tokens: 32768,
            temperature: 1.0,
            top_p: 0.95,
            response_modalities: vec![ResponseModality::Text, ResponseModality::Image],
            safety_settings,
        }
    }
}

impl GenerationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}
