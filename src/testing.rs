//! Test doubles shared by unit and integration tests.
//! Compiled for `cfg(test)` and behind the `test-support` feature.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{
    error::{Result, TryOnError},
    gemini::{ChunkStream, GenerationRequest, GenerativeImageModel, Part, ResponseChunk},
    models::InlineImage,
};

/// A model that replays a fixed script of chunks and counts sessions.
pub struct StubModel {
    calls: AtomicUsize,
    open_error: Option<TryOnError>,
    chunks: Vec<Result<ResponseChunk>>,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl StubModel {
    pub fn streaming(chunks: Vec<Result<ResponseChunk>>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            open_error: None,
            chunks,
            last_request: Mutex::new(None),
        })
    }

    /// Fails when the session is opened, before any chunk.
    pub fn failing_to_open(error: TryOnError) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            open_error: Some(error),
            chunks: vec![],
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl GenerativeImageModel for StubModel {
    async fn open_stream(&self, request: GenerationRequest) -> Result<ChunkStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request);
        }
        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }
        Ok(Box::pin(futures::stream::iter(self.chunks.clone())))
    }

    fn model_id(&self) -> &str {
        "stub-model"
    }
}

pub fn image_chunk(mime_type: &str, data: &str) -> ResponseChunk {
    ResponseChunk::from_parts(vec![image_part(mime_type, data)])
}

pub fn image_part(mime_type: &str, data: &str) -> Part {
    Part::image(InlineImage {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}

pub fn text_chunk(text: &str) -> ResponseChunk {
    ResponseChunk::from_parts(vec![Part::text(text)])
}

pub const BOUNDARY: &str = "----tryon-test-boundary";

/// One file field of a hand-built `multipart/form-data` body.
pub struct FilePart<'a> {
    pub name: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

/// A plain form field, sent without a filename.
pub struct TextPart<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

pub fn multipart_body(parts: &[FilePart<'_>]) -> Vec<u8> {
    form_body(&[], parts)
}

/// Text fields first, then file fields.
pub fn form_body(texts: &[TextPart<'_>], files: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for text in texts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", text.name).as_bytes(),
        );
        body.extend_from_slice(text.value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for part in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.name, part.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// First bytes of a PNG / JPEG file; the relay never decodes pixels.
pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R', 0, 0, 0,
    10, 0, 0, 0, 10, 8, 2, 0, 0, 0,
];
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0, 0xFF, 0xD9];
