use async_stream::try_stream;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;

use crate::{
    config::GeminiConfig,
    error::{Result, TryOnError},
    models::GenerationSettings,
};

use super::{
    sse::SseParser, ChunkStream, GenerateContentRequest, GenerationRequest, GenerativeImageModel,
    ResponseChunk,
};

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
    settings: GenerationSettings,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: GeminiConfig, client: Client) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        Ok(Self {
            client,
            api_key,
            model: config.model,
            api_base: config.api_base,
            settings: config.generation,
        })
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    fn stream_endpoint(&self) -> String {
        let trimmed = self.model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{}", trimmed)
        };
        format!(
            "{}/{}:streamGenerateContent?alt=sse",
            self.api_base, model_path
        )
    }
}

#[async_trait]
impl GenerativeImageModel for GeminiClient {
    async fn open_stream(&self, request: GenerationRequest) -> Result<ChunkStream> {
        let payload = GenerateContentRequest::new(&request, &self.settings);
        let endpoint = self.stream_endpoint();

        log::info!(
            "Opening generation stream with model: {} ({} inline images)",
            self.model,
            request.images.len()
        );

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| TryOnError::Model(format!("request to {} failed: {}", self.model, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Gemini API returned {}: {}", status, body);
            return Err(TryOnError::Model(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        Ok(Box::pin(chunk_stream(response)))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

fn chunk_stream(response: reqwest::Response) -> impl Stream<Item = Result<ResponseChunk>> + Send {
    try_stream! {
        let mut body = response.bytes_stream();
        let mut parser = SseParser::default();

        while let Some(bytes) = body.next().await {
            let bytes = bytes.map_err(|e| TryOnError::Model(format!("stream interrupted: {}", e)))?;
            for data in parser.process(&bytes)? {
                yield parse_chunk(&data)?;
            }
        }

        if let Some(data) = parser.finish()? {
            yield parse_chunk(&data)?;
        }
    }
}

fn parse_chunk(data: &str) -> Result<ResponseChunk> {
    let chunk: ResponseChunk = serde_json::from_str(data)
        .map_err(|e| TryOnError::Model(format!("malformed stream chunk: {}", e)))?;

    if let Some(error) = &chunk.error {
        return Err(TryOnError::Model(format!(
            "Gemini stream error {}: {}",
            error.status.as_deref().unwrap_or("UNKNOWN"),
            error.message
        )));
    }

    Ok(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(model: &str) -> GeminiClient {
        let config = GeminiConfig::new()
            .with_api_key("test-key")
            .with_model(model)
            .with_api_base("http://localhost:1/v1beta");
        GeminiClient::new(config).unwrap()
    }

    #[test]
    fn requires_api_key() {
        assert!(matches!(
            GeminiClient::new(GeminiConfig::new()),
            Err(TryOnError::Config(_))
        ));
    }

    #[test]
    fn endpoint_for_model() {
        assert_eq!(
            client("gemini-2.5-flash-image").stream_endpoint(),
            "http://localhost:1/v1beta/models/gemini-2.5-flash-image:streamGenerateContent?alt=sse"
        );
        assert_eq!(
            client("models/custom").stream_endpoint(),
            "http://localhost:1/v1beta/models/custom:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn error_chunk_becomes_model_error() {
        let err = parse_chunk(r#"{"error":{"code":429,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#)
            .unwrap_err();
        assert!(matches!(err, TryOnError::Model(msg) if msg.contains("quota")));

        assert!(matches!(parse_chunk("{not json"), Err(TryOnError::Model(_))));
    }

    #[tokio::test]
    async fn unreachable_api_is_a_model_error() {
        let request = GenerationRequest {
            prompt: "p".into(),
            images: vec![],
        };
        let result = client("m").open_stream(request).await;
        assert!(matches!(result, Err(TryOnError::Model(_))));
    }
}
