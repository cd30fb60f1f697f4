#![deny(missing_docs)]
//! Stream a file-backed prompt through a local Ollama server.
//!
//! The crate reads a prompt file, posts it to Ollama's
//! [`/api/generate`](https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion)
//! endpoint and renders the generated tokens as they arrive.
//!
//! # Usage
//!
//! ```no_run
//! use prompt_stream::{PromptStreamer, StreamerConfig};
//!
//! # async fn demo() -> Result<(), prompt_stream::StreamError> {
//! let streamer = PromptStreamer::new(StreamerConfig::default());
//! let mut stdout = std::io::stdout().lock();
//! streamer.run(&mut stdout).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - NDJSON streaming (Ollama uses newline-delimited JSON, not SSE)
//! - Incremental, flushed rendering to any [`std::io::Write`] sink
//! - Stops on the first `done: true` chunk, or when the server closes the stream
//! - Error mapping from HTTP status codes to [`StreamError`] variants

pub mod client;
pub mod error;
pub mod prompt;
pub mod render;
pub mod streamer;
pub mod streaming;
pub mod types;

pub use client::GenerateClient;
pub use error::StreamError;
pub use render::{RenderSummary, StreamOutcome, render_stream};
pub use streamer::{PromptStreamer, StreamerConfig};
pub use streaming::ChunkStream;
pub use types::{GenerateChunk, GenerateOptions, GenerateRequest};
