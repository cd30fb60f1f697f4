//! Ollama `/api/generate` request and response types.
//!
//! The request body is deliberately minimal: with no optional fields set it
//! serializes to exactly `{"model": ..., "prompt": ...}`. Ollama streams by
//! default, so no `stream` flag is sent.

use serde::{Deserialize, Deserializer, Serialize};

/// Ollama `/api/generate` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gpt-oss:20b").
    pub model: String,
    /// Full prompt text: preamble followed by the prompt file contents.
    pub prompt: String,
    /// How long to keep the model loaded in memory (e.g. "5m", "0").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
    /// Generation options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

impl GenerateRequest {
    /// Build a request with only the required fields.
    #[must_use]
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            keep_alive: None,
            options: None,
        }
    }
}

/// Generation options understood by Ollama.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerateOptions {
    /// Sampling temperature (0.0 - 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    /// Context window size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    /// Top-p (nucleus sampling).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl GenerateOptions {
    /// Whether no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One line of the `/api/generate` NDJSON stream.
///
/// Every field is optional on the wire. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerateChunk {
    /// Incremental text fragment.
    #[serde(default)]
    pub response: Option<String>,
    /// Completion flag. No further chunks follow one where this is `true`.
    ///
    /// Any JSON value is accepted and read by truthiness: `null`, `false`,
    /// zero, and empty strings, arrays, or objects are not done.
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub done: bool,
    /// Why generation stopped (e.g. "stop", "length").
    #[serde(default)]
    pub done_reason: Option<String>,
    /// Model that generated the chunk.
    #[serde(default)]
    pub model: Option<String>,
    /// Number of tokens in the prompt.
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    /// Number of tokens generated.
    #[serde(default)]
    pub eval_count: Option<u64>,
    /// Total time spent on the request in nanoseconds.
    #[serde(default)]
    pub total_duration: Option<u64>,
    /// Time spent generating the response in nanoseconds.
    #[serde(default)]
    pub eval_duration: Option<u64>,
    /// Error reported by the server in place of a token.
    #[serde(default)]
    pub error: Option<String>,
}

impl GenerateChunk {
    /// Whether the chunk carries neither a text fragment nor the completion flag.
    #[must_use]
    pub fn is_unrecognized(&self) -> bool {
        self.response.is_none() && !self.done
    }
}

fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

/// Truthiness of a JSON value.
fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
