pub mod image_client;
pub mod sse;
pub mod types;

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

use crate::{error::Result, models::InlineImage};

pub use image_client::GeminiClient;
pub use types::{Candidate, Content, GenerateContentRequest, Part, ResponseChunk};

/// Lazy, finite, one-shot sequence of response chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ResponseChunk>> + Send>>;

/// What one generation session is asked to do.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub images: Vec<InlineImage>,
}

/// An external generative-image capability.
///
/// Implementations open one streamed session per call. Sampling and safety
/// parameters are fixed at construction time.
#[async_trait]
pub trait GenerativeImageModel: Send + Sync {
    async fn open_stream(&self, request: GenerationRequest) -> Result<ChunkStream>;

    fn model_id(&self) -> &str;
}
