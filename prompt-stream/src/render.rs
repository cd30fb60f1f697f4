//! Incremental rendering of generated text.

use std::io::Write;

use futures::{Stream, StreamExt};

use crate::error::StreamError;
use crate::types::GenerateChunk;

/// How a stream reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// A chunk with `done: true` was observed.
    Done,
    /// The server closed the stream without a completion chunk.
    Exhausted,
}

/// What [`render_stream`] wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    /// Terminal state of the stream.
    pub outcome: StreamOutcome,
    /// Number of `response` fragments written.
    pub fragments: usize,
    /// Bytes of generated text written, excluding the trailing newline.
    pub bytes_written: usize,
    /// The completion chunk, when one was observed.
    pub final_chunk: Option<GenerateChunk>,
}

/// Write each chunk's `response` text to `out` as it arrives.
///
/// Every fragment is flushed immediately. The `done` flag is checked after
/// the fragment of the same chunk is written, so a chunk carrying both is
/// printed before iteration stops. Exactly one `\n` follows the last
/// fragment. The first error is returned and nothing more is written.
pub async fn render_stream<S, W>(stream: S, out: &mut W) -> Result<RenderSummary, StreamError>
where
    S: Stream<Item = Result<GenerateChunk, StreamError>>,
    W: Write + ?Sized,
{
    let mut stream = std::pin::pin!(stream);
    let mut summary = RenderSummary {
        outcome: StreamOutcome::Exhausted,
        fragments: 0,
        bytes_written: 0,
        final_chunk: None,
    };

    while let Some(item) = stream.next().await {
        let chunk = item?;

        if let Some(text) = &chunk.response {
            out.write_all(text.as_bytes()).map_err(StreamError::Output)?;
            out.flush().map_err(StreamError::Output)?;
            summary.fragments += 1;
            summary.bytes_written += text.len();
        } else if !chunk.done {
            if let Some(message) = &chunk.error {
                tracing::warn!(error = %message, "server reported an error chunk");
            } else {
                tracing::trace!("skipping chunk without response or done");
            }
        }

        if chunk.done {
            tracing::debug!(
                done_reason = chunk.done_reason.as_deref().unwrap_or(""),
                prompt_eval_count = chunk.prompt_eval_count.unwrap_or(0),
                eval_count = chunk.eval_count.unwrap_or(0),
                "generation complete"
            );
            summary.outcome = StreamOutcome::Done;
            summary.final_chunk = Some(chunk);
            break;
        }
    }

    out.write_all(b"\n").map_err(StreamError::Output)?;
    out.flush().map_err(StreamError::Output)?;

    if summary.outcome == StreamOutcome::Exhausted {
        tracing::debug!(fragments = summary.fragments, "stream closed without completion flag");
    }

    Ok(summary)
}
