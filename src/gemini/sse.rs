//! Incremental parser for the `text/event-stream` body returned with `alt=sse`.
//! Only `data:` lines matter here; `event:`, `id:` and comment lines are skipped.

use crate::error::{Result, TryOnError};

#[derive(Default)]
pub struct SseParser {
    bytes: Vec<u8>,
}

impl SseParser {
    /// Feed a network chunk, returning the data payload of every complete event.
    pub fn process(&mut self, chunk: &[u8]) -> Result<Vec<String>> {
        // JSON payloads escape their own carriage returns, so raw ones are framing only
        self.bytes.extend(chunk.iter().copied().filter(|b| *b != b'\r'));
        let mut payloads = vec![];

        while let Some(pos) = self.bytes.windows(2).position(|w| w == b"\n\n") {
            let event: Vec<u8> = self.bytes.drain(..pos + 2).collect();
            if let Some(data) = Self::parse_event(&event[..pos])? {
                payloads.push(data);
            }
        }

        Ok(payloads)
    }

    /// Parse whatever is left once the body ends without a trailing blank line.
    pub fn finish(&mut self) -> Result<Option<String>> {
        if self.bytes.iter().all(u8::is_ascii_whitespace) {
            self.bytes.clear();
            return Ok(None);
        }
        let remaining = std::mem::take(&mut self.bytes);
        Self::parse_event(&remaining)
    }

    fn parse_event(buf: &[u8]) -> Result<Option<String>> {
        let text = std::str::from_utf8(buf)
            .map_err(|e| TryOnError::ResponseError(format!("event stream is not UTF-8: {}", e)))?;
        let mut data = String::new();

        for line in text.lines() {
            if let Some(value) = line.strip_prefix("data:") {
                if !data.is_empty() {
                    data.push('\n');
                }
                data.push_str(value.strip_prefix(' ').unwrap_or(value));
            }
        }

        Ok((!data.is_empty()).then_some(data))
    }
}
