//! The try-on relay: validates the two uploads, opens one generation session,
//! drains its stream and normalizes the result into a single encoded image.

use futures::StreamExt;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::{Result, TryOnError},
    gemini::{ChunkStream, GenerationRequest, GenerativeImageModel},
    logger::RequestTimer,
    models::{strip_data_uri_prefix, EncodedImage, ImageUpload, InlineImage, UploadPayload},
};

pub const TRY_ON_PROMPT: &str = "Generate a photorealistic image where the person from the first image is wearing the t-shirt from the second image. The result must be a high-quality image that maintains the person's pose, fits the t-shirt naturally, preserves the background, and has realistic lighting. Return the image inline.";

#[derive(Clone)]
pub struct TryOnRelay {
    model: Arc<dyn GenerativeImageModel>,
    prompt: String,
}

/// What a drained stream left behind.
#[derive(Debug, Default)]
struct StreamCapture {
    image: Option<InlineImage>,
    text: String,
    chunks: usize,
}

impl TryOnRelay {
    pub fn new(model: Arc<dyn GenerativeImageModel>) -> Self {
        Self {
            model,
            prompt: TRY_ON_PROMPT.to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// Run one try-on request end to end.
    ///
    /// Rejects with `MissingImages` before touching the model when either
    /// upload is absent.
    pub async fn relay(
        &self,
        user_image: Option<ImageUpload>,
        product_image: Option<ImageUpload>,
    ) -> Result<EncodedImage> {
        let (Some(user_image), Some(product_image)) = (user_image, product_image) else {
            log::warn!("Rejecting try-on request: missing image part");
            return Err(TryOnError::MissingImages);
        };

        self.generate(UploadPayload {
            user_image,
            product_image,
        })
        .await
    }

    pub async fn generate(&self, payload: UploadPayload) -> Result<EncodedImage> {
        let request_id = Uuid::new_v4().to_string();
        let _timer = RequestTimer::new("try-on generation", &request_id);

        log::info!(
            "[req:{}] Relaying try-on: user image {} ({} bytes), product image {} ({} bytes)",
            request_id,
            payload.user_image.content_type,
            payload.user_image.len(),
            payload.product_image.content_type,
            payload.product_image.len()
        );

        let request = GenerationRequest {
            prompt: self.prompt.clone(),
            images: vec![payload.user_image.to_inline(), payload.product_image.to_inline()],
        };

        let stream = self.model.open_stream(request).await.map_err(|e| {
            log::error!("[req:{}] Failed to open generation stream: {}", request_id, e);
            as_model_error(e)
        })?;

        let capture = drain(stream).await.map_err(|e| {
            log::error!("[req:{}] Generation stream failed: {}", request_id, e);
            as_model_error(e)
        })?;

        // an inline part with an empty payload is no image at all
        let image = capture
            .image
            .filter(|image| !strip_data_uri_prefix(&image.data).is_empty());

        match image {
            Some(image) => {
                log::info!(
                    "[req:{}] Image generated ({} chunks, {})",
                    request_id,
                    capture.chunks,
                    if image.mime_type.is_empty() { "no mime type" } else { image.mime_type.as_str() }
                );
                let data = strip_data_uri_prefix(&image.data).to_string();
                Ok(EncodedImage::new(data, Some(image.mime_type)))
            }
            None => {
                log::error!(
                    "[req:{}] No image in model response after {} chunks. Text received: {}",
                    request_id,
                    capture.chunks,
                    capture.text
                );
                Err(TryOnError::NoImage {
                    diagnostic: capture.text,
                })
            }
        }
    }
}

/// Consume the whole stream. Each inline image overwrites the previous one.
async fn drain(mut stream: ChunkStream) -> Result<StreamCapture> {
    let mut capture = StreamCapture::default();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        capture.chunks += 1;

        for part in chunk.parts() {
            if let Some(image) = &part.inline_data {
                capture.image = Some(image.clone());
            }
            if let Some(text) = &part.text {
                capture.text.push_str(text);
            }
        }
    }

    Ok(capture)
}

fn as_model_error(e: TryOnError) -> TryOnError {
    match e {
        TryOnError::Model(_) => e,
        other => TryOnError::Model(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::{Part, ResponseChunk};
    use crate::testing::{image_chunk, image_part, text_chunk, StubModel};

    fn uploads() -> (ImageUpload, ImageUpload) {
        (
            ImageUpload::new("me.png", Some("image/png".into()), vec![1u8, 2, 3]),
            ImageUpload::new("shirt.jpg", Some("image/jpeg".into()), vec![4u8, 5]),
        )
    }

    #[tokio::test]
    async fn missing_image_never_calls_model() {
        let model = StubModel::streaming(vec![]);
        let relay = TryOnRelay::new(model.clone());
        let (user, product) = uploads();

        let first = relay.relay(Some(user), None).await;
        let second = relay.relay(None, Some(product)).await;
        let third = relay.relay(None, None).await;

        for result in [first, second, third] {
            assert!(matches!(result, Err(TryOnError::MissingImages)));
        }
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn sends_prompt_then_user_then_product() {
        let model = StubModel::streaming(vec![Ok(image_chunk("image/png", "AAAA"))]);
        let relay = TryOnRelay::new(model.clone());
        let (user, product) = uploads();

        relay.relay(Some(user), Some(product)).await.unwrap();

        let request = model.last_request().unwrap();
        assert_eq!(model.calls(), 1);
        assert_eq!(request.prompt, TRY_ON_PROMPT);
        assert_eq!(request.images.len(), 2);
        assert_eq!(request.images[0].mime_type, "image/png");
        assert_eq!(request.images[0].data, "AQID");
        assert_eq!(request.images[1].mime_type, "image/jpeg");
        assert_eq!(request.images[1].data, "BAU=");
    }

    #[tokio::test]
    async fn last_inline_image_wins_across_chunks() {
        let model = StubModel::streaming(vec![
            Ok(ResponseChunk::from_parts(vec![
                Part::text("thinking"),
                image_part("image/jpeg", "FIRST"),
            ])),
            Ok(ResponseChunk::default()),
            Ok(ResponseChunk::from_parts(vec![
                image_part("image/png", "data:image/png;base64,SECOND"),
                Part::text("done"),
            ])),
        ]);
        let (user, product) = uploads();

        let image = TryOnRelay::new(model)
            .relay(Some(user), Some(product))
            .await
            .unwrap();
        assert_eq!(image.data, "SECOND");
        assert_eq!(image.mime_type, "image/png");
    }

    #[tokio::test]
    async fn missing_mime_type_defaults_to_png() {
        let model = StubModel::streaming(vec![Ok(image_chunk("", "AAAA"))]);
        let (user, product) = uploads();

        let image = TryOnRelay::new(model)
            .relay(Some(user), Some(product))
            .await
            .unwrap();
        assert_eq!(image.mime_type, "image/png");
    }

    #[tokio::test]
    async fn text_only_stream_is_no_image() {
        let model = StubModel::streaming(vec![Ok(text_chunk("I can't ")), Ok(text_chunk("do that"))]);
        let (user, product) = uploads();

        let err = TryOnRelay::new(model)
            .relay(Some(user), Some(product))
            .await
            .unwrap_err();
        match err {
            TryOnError::NoImage { diagnostic } => assert_eq!(diagnostic, "I can't do that"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_inline_payload_is_no_image() {
        let model = StubModel::streaming(vec![
            Ok(image_chunk("image/png", "AAAA")),
            Ok(image_chunk("image/png", "")),
        ]);
        let (user, product) = uploads();

        let err = TryOnRelay::new(model)
            .relay(Some(user), Some(product))
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::NoImage { .. }));
    }

    #[tokio::test]
    async fn bare_data_uri_prefix_is_no_image() {
        let model = StubModel::streaming(vec![Ok(image_chunk("image/png", "data:image/png;base64,"))]);
        let (user, product) = uploads();

        let err = TryOnRelay::new(model)
            .relay(Some(user), Some(product))
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::NoImage { .. }));
    }

    #[tokio::test]
    async fn stream_failure_discards_earlier_image() {
        let model = StubModel::streaming(vec![
            Ok(image_chunk("image/png", "AAAA")),
            Err(TryOnError::ResponseError("connection reset".into())),
        ]);
        let (user, product) = uploads();

        let err = TryOnRelay::new(model)
            .relay(Some(user), Some(product))
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::Model(msg) if msg.contains("connection reset")));
    }

    #[tokio::test]
    async fn open_failure_is_a_model_error() {
        let model = StubModel::failing_to_open(TryOnError::Model("401 Unauthorized".into()));
        let (user, product) = uploads();

        let err = TryOnRelay::new(model.clone())
            .relay(Some(user), Some(product))
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::Model(_)));
        assert_eq!(model.calls(), 1);
    }
}
