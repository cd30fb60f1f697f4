//! NDJSON streaming support for the Ollama Generate API.
//!
//! Ollama emits one JSON object per line:
//! ```text
//! {"model":"gpt-oss:20b","response":"Hello","done":false}
//! {"model":"gpt-oss:20b","response":" world","done":false}
//! {"model":"gpt-oss:20b","response":"","done":true,"done_reason":"stop","eval_count":10,"prompt_eval_count":20}
//! ```
//!
//! Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion>

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use reqwest::Response;

use crate::error::StreamError;
use crate::types::GenerateChunk;

/// Lazy, finite, non-restartable sequence of decoded response chunks.
///
/// Owns the HTTP response; dropping it closes the connection. The stream
/// ends after the first chunk with `done: true`, after the first error, or
/// when the server closes the body.
pub struct ChunkStream {
    inner: Pin<Box<dyn Stream<Item = Result<GenerateChunk, StreamError>> + Send>>,
}

impl ChunkStream {
    /// Wrap an arbitrary chunk stream.
    pub fn new(stream: impl Stream<Item = Result<GenerateChunk, StreamError>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Build a stream from raw NDJSON body bytes.
    pub fn from_bytes(
        byte_stream: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
    ) -> Self {
        Self::new(parse_ndjson_stream(byte_stream))
    }
}

impl Stream for ChunkStream {
    type Item = Result<GenerateChunk, StreamError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inner.as_mut().poll_next(cx)
    }
}

/// Wrap an HTTP response body into a [`ChunkStream`].
pub(crate) fn stream_generation(response: Response) -> ChunkStream {
    ChunkStream::from_bytes(response.bytes_stream())
}

/// Parse a raw byte stream into decoded chunks.
///
/// Bytes are buffered across network chunks until a full line is available,
/// so a line (or a multi-byte character) split between two reads is decoded
/// once it is complete. A trailing line without a newline is decoded when
/// the body ends.
pub fn parse_ndjson_stream(
    byte_stream: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> impl Stream<Item = Result<GenerateChunk, StreamError>> + Send + 'static {
    async_stream::stream! {
        let mut bytes_stream = std::pin::pin!(byte_stream);
        let mut line_buf: Vec<u8> = Vec::new();

        while let Some(chunk_result) = bytes_stream.next().await {
            let chunk = match chunk_result {
                Ok(b) => b,
                Err(e) => {
                    yield Err(StreamError::Network(e));
                    return;
                }
            };

            line_buf.extend_from_slice(&chunk);

            while let Some(newline_pos) = line_buf.iter().position(|b| *b == b'\n') {
                let raw: Vec<u8> = line_buf.drain(..=newline_pos).collect();
                match decode_line(raw) {
                    Ok(Some(chunk)) => {
                        let done = chunk.done;
                        yield Ok(chunk);
                        if done {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        }

        if !line_buf.is_empty() {
            match decode_line(std::mem::take(&mut line_buf)) {
                Ok(Some(chunk)) => yield Ok(chunk),
                Ok(None) => {}
                Err(e) => yield Err(e),
            }
        }
    }
}

/// Decode one raw line. Blank lines yield `None` without reaching the parser.
fn decode_line(mut raw: Vec<u8>) -> Result<Option<GenerateChunk>, StreamError> {
    while matches!(raw.last(), Some(b'\n' | b'\r')) {
        raw.pop();
    }
    let line = String::from_utf8(raw)?;
    if line.trim().is_empty() {
        return Ok(None);
    }

    tracing::trace!(line = %line, "decoding NDJSON line");

    serde_json::from_str(&line)
        .map(Some)
        .map_err(|source| StreamError::Decode { line, source })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
