//! The read -> POST -> stream -> print pipeline.

use std::io::Write;
use std::path::PathBuf;

use crate::client::{DEFAULT_BASE_URL, DEFAULT_MODEL, GenerateClient};
use crate::error::StreamError;
use crate::prompt::{DEFAULT_PREAMBLE, DEFAULT_PROMPT_FILE, read_prompt};
use crate::render::{RenderSummary, render_stream};
use crate::types::GenerateOptions;

/// Settings for one [`PromptStreamer`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamerConfig {
    /// File whose contents follow the preamble in the prompt.
    pub prompt_file: PathBuf,
    /// Text placed before the file contents.
    pub preamble: String,
    /// Model identifier.
    pub model: String,
    /// Ollama base URL.
    pub base_url: String,
    /// Optional keep_alive duration.
    pub keep_alive: Option<String>,
    /// Generation options; omitted from the request when empty.
    pub options: GenerateOptions,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            prompt_file: PathBuf::from(DEFAULT_PROMPT_FILE),
            preamble: DEFAULT_PREAMBLE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            keep_alive: None,
            options: GenerateOptions::default(),
        }
    }
}

/// Sends one prompt file to Ollama and renders the streamed reply.
#[derive(Debug, Clone)]
pub struct PromptStreamer {
    config: StreamerConfig,
    client: GenerateClient,
}

impl PromptStreamer {
    /// Build a streamer and its HTTP client from `config`.
    #[must_use]
    pub fn new(config: StreamerConfig) -> Self {
        let mut client = GenerateClient::new()
            .model(config.model.clone())
            .base_url(config.base_url.clone())
            .options(config.options.clone());
        if let Some(keep_alive) = &config.keep_alive {
            client = client.keep_alive(keep_alive.clone());
        }
        Self { config, client }
    }

    /// The settings this streamer was built from.
    #[must_use]
    pub fn config(&self) -> &StreamerConfig {
        &self.config
    }

    /// Run once: read the prompt file, send it, and write the reply to `out`.
    ///
    /// The prompt file is read before any connection is opened, so a missing
    /// file fails without contacting the server.
    pub async fn run<W: Write + ?Sized>(&self, out: &mut W) -> Result<RenderSummary, StreamError> {
        let prompt = read_prompt(&self.config.prompt_file, &self.config.preamble)?;
        let request = self.client.request(prompt);
        let stream = self.client.stream_generate(&request).await?;
        render_stream(stream, out).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_fixed_values() {
        let config = StreamerConfig::default();
        assert_eq!(config.prompt_file, PathBuf::from("chatgpt.py"));
        assert_eq!(config.preamble, "hi:\n\n");
        assert_eq!(config.model, "gpt-oss:20b");
        assert_eq!(config.base_url, "http://localhost:11434");
        assert!(config.keep_alive.is_none());
        assert!(config.options.is_empty());
    }

    #[test]
    fn client_inherits_config() {
        let streamer = PromptStreamer::new(StreamerConfig {
            model: "llama3.2".into(),
            base_url: "localhost:9999".into(),
            keep_alive: Some("0".into()),
            ..Default::default()
        });
        assert_eq!(streamer.client.generate_url(), "http://localhost:9999/api/generate");
        let req = streamer.client.request("p");
        assert_eq!(req.model, "llama3.2");
        assert_eq!(req.keep_alive.as_deref(), Some("0"));
        assert_eq!(streamer.config().model, "llama3.2");
    }
}
