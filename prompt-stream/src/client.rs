//! Ollama Generate API client struct and builder.

use crate::error::{StreamError, map_http_status};
use crate::streaming::{ChunkStream, stream_generation};
use crate::types::{GenerateOptions, GenerateRequest};

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-oss:20b";

/// Default Ollama API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Client for the Ollama Generate API.
///
/// # Example
///
/// ```no_run
/// use prompt_stream::GenerateClient;
///
/// let client = GenerateClient::new()
///     .model("gpt-oss:20b")
///     .base_url("http://localhost:11434");
/// ```
#[derive(Debug, Clone)]
pub struct GenerateClient {
    /// Model identifier placed in every request.
    pub(crate) model: String,
    /// API base URL (override for testing or remote Ollama instances).
    pub(crate) base_url: String,
    /// Optional keep_alive duration string (e.g. "5m", "0" to unload).
    pub(crate) keep_alive: Option<String>,
    /// Generation options sent with every request, if any are set.
    pub(crate) options: GenerateOptions,
    /// Shared HTTP client. No timeout: a stalled server blocks the stream.
    pub(crate) client: reqwest::Client,
}

impl GenerateClient {
    /// Create a new client with the default model and local base URL.
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            keep_alive: None,
            options: GenerateOptions::default(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL.
    ///
    /// Accepts `OLLAMA_HOST`-style values: `host` or `host:port` without a
    /// scheme get `http://` and, when no port is given, port 11434.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&url.into());
        self
    }

    /// Set the keep_alive duration for model memory residency.
    #[must_use]
    pub fn keep_alive(mut self, duration: impl Into<String>) -> Self {
        self.keep_alive = Some(duration.into());
        self
    }

    /// Set generation options.
    #[must_use]
    pub fn options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the generate endpoint URL.
    #[must_use]
    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    /// Build the request body for `prompt` using this client's settings.
    #[must_use]
    pub fn request(&self, prompt: impl Into<String>) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.into(),
            keep_alive: self.keep_alive.clone(),
            options: (!self.options.is_empty()).then(|| self.options.clone()),
        }
    }

    /// POST `request` to `/api/generate` and return the streamed chunks.
    ///
    /// A non-success status is read in full and mapped to an error before
    /// any chunk is produced.
    pub async fn stream_generate(&self, request: &GenerateRequest) -> Result<ChunkStream, StreamError> {
        let url = self.generate_url();

        tracing::debug!(url = %url, model = %request.model, prompt_len = request.prompt.len(), "sending generate request to Ollama");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await?;
            return Err(map_http_status(status, &body_text));
        }

        Ok(stream_generation(response))
    }
}

impl Default for GenerateClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Port Ollama listens on when `OLLAMA_HOST` names only a host.
const DEFAULT_PORT: u16 = 11434;

/// Turn a base URL or an `OLLAMA_HOST`-style value into a connectable URL.
///
/// Without a scheme, `http://` is assumed and a missing port defaults to
/// 11434. The unspecified bind addresses `0.0.0.0` and `[::]` (and an empty
/// host) are replaced with loopback.
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let (scheme, rest, explicit_scheme) = match trimmed.split_once("://") {
        Some((scheme, rest)) => (scheme, rest, true),
        None => ("http", trimmed, false),
    };
    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    let (host, port) = split_host_port(authority);

    let host = match host {
        "" | "0.0.0.0" => "127.0.0.1",
        "[::]" => "[::1]",
        other => other,
    };

    match port {
        Some(port) => format!("{scheme}://{host}:{port}{path}"),
        None if explicit_scheme => format!("{scheme}://{host}{path}"),
        None => format!("{scheme}://{host}:{DEFAULT_PORT}{path}"),
    }
}

/// Split `host[:port]`, leaving bracketed IPv6 hosts intact.
fn split_host_port(authority: &str) -> (&str, Option<&str>) {
    match authority.rsplit_once(':') {
        Some((host, port))
            if !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit())
                && (!host.contains(':') || host.ends_with(']')) =>
        {
            (host, Some(port))
        }
        _ => (authority, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_set() {
        let client = GenerateClient::new();
        assert_eq!(client.model, DEFAULT_MODEL);
    }

    #[test]
    fn default_base_url_is_set() {
        let client = GenerateClient::new();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.generate_url(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn builder_overrides_model() {
        let client = GenerateClient::new().model("mistral");
        assert_eq!(client.model, "mistral");
    }

    #[test]
    fn builder_overrides_base_url() {
        let client = GenerateClient::new().base_url("http://remote:11434");
        assert_eq!(client.generate_url(), "http://remote:11434/api/generate");
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let client = GenerateClient::new().base_url("http://localhost:9999/");
        assert_eq!(client.generate_url(), "http://localhost:9999/api/generate");
    }

    #[test]
    fn host_without_scheme_gets_http() {
        let client = GenerateClient::new().base_url("127.0.0.1:11434");
        assert_eq!(client.generate_url(), "http://127.0.0.1:11434/api/generate");
    }

    #[test]
    fn bare_host_gets_default_port() {
        let client = GenerateClient::new().base_url("localhost");
        assert_eq!(client.generate_url(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn unspecified_bind_address_maps_to_loopback() {
        let client = GenerateClient::new().base_url("0.0.0.0");
        assert_eq!(client.generate_url(), "http://127.0.0.1:11434/api/generate");

        let client = GenerateClient::new().base_url("0.0.0.0:8080");
        assert_eq!(client.generate_url(), "http://127.0.0.1:8080/api/generate");

        let client = GenerateClient::new().base_url("[::]");
        assert_eq!(client.generate_url(), "http://[::1]:11434/api/generate");
    }

    #[test]
    fn ipv6_host_keeps_brackets() {
        let client = GenerateClient::new().base_url("[::1]:9000");
        assert_eq!(client.generate_url(), "http://[::1]:9000/api/generate");
    }

    #[test]
    fn explicit_scheme_without_port_is_left_alone() {
        let client = GenerateClient::new().base_url("http://ollama.lan");
        assert_eq!(client.generate_url(), "http://ollama.lan/api/generate");
    }

    #[test]
    fn path_prefix_is_kept() {
        let client = GenerateClient::new().base_url("gpu-box/ollama");
        assert_eq!(client.generate_url(), "http://gpu-box:11434/ollama/api/generate");
    }

    #[test]
    fn https_scheme_is_kept() {
        let client = GenerateClient::new().base_url("https://ollama.internal");
        assert_eq!(client.base_url, "https://ollama.internal");
    }

    #[test]
    fn keep_alive_defaults_to_none() {
        let client = GenerateClient::new();
        assert!(client.keep_alive.is_none());
        assert!(client.request("x").keep_alive.is_none());
    }

    #[test]
    fn request_carries_client_settings() {
        let client = GenerateClient::new()
            .model("llama3.2")
            .keep_alive("5m")
            .options(GenerateOptions {
                num_predict: Some(64),
                ..Default::default()
            });
        let req = client.request("hi");
        assert_eq!(req.model, "llama3.2");
        assert_eq!(req.prompt, "hi");
        assert_eq!(req.keep_alive.as_deref(), Some("5m"));
        assert_eq!(req.options.and_then(|o| o.num_predict), Some(64));
    }

    #[test]
    fn empty_options_are_omitted() {
        let req = GenerateClient::new().request("hi");
        assert!(req.options.is_none());
    }

    #[test]
    fn default_impl_matches_new() {
        let client = GenerateClient::default();
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }
}
