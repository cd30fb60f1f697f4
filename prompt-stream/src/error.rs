//! Error taxonomy and HTTP/reqwest error mapping.

use std::path::PathBuf;

/// Errors from reading the prompt, talking to Ollama, or rendering output.
///
/// None of these are retried. They propagate to the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The prompt file could not be read.
    #[error("cannot read prompt file {}: {source}", path.display())]
    PromptFile {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Network-level error (connection refused, DNS failure, body read failure).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Requested model does not exist on the server.
    #[error("model not found: {0}")]
    ModelNotFound(String),
    /// Malformed or rejected request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Server-side failure.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// A stream line was not a valid response chunk.
    #[error("invalid JSON line in stream: {source}: {line}")]
    Decode {
        /// The offending line.
        line: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// A stream line was not valid UTF-8.
    #[error("UTF-8 decode error in stream: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// Writing rendered output failed.
    #[error("output error: {0}")]
    Output(#[source] std::io::Error),
}

/// Map a non-success `/api/generate` status to a [`StreamError`].
///
/// Ollama answers an unknown model with 404 and a body such as
/// `{"error":"model 'gpt-oss:20b' not found"}`, and a malformed body with 400.
/// Status codes Ollama does not document keep the code in the message.
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> StreamError {
    use reqwest::StatusCode;

    let body = body.trim().to_string();
    match status {
        StatusCode::NOT_FOUND => StreamError::ModelNotFound(body),
        StatusCode::BAD_REQUEST => StreamError::InvalidRequest(body),
        s if s.is_server_error() => StreamError::ServiceUnavailable(body),
        s => StreamError::InvalidRequest(format!("HTTP {s}: {body}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    const MISSING_MODEL_BODY: &str = r#"{"error":"model 'gpt-oss:20b' not found"}"#;

    #[test]
    fn missing_gpt_oss_model_is_model_not_found() {
        let err = map_http_status(StatusCode::NOT_FOUND, MISSING_MODEL_BODY);
        assert!(err.to_string().contains("gpt-oss:20b"), "{err}");
        match err {
            StreamError::ModelNotFound(body) => assert_eq!(body, MISSING_MODEL_BODY),
            other => panic!("expected ModelNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn rejected_prompt_body_is_invalid_request() {
        let err = map_http_status(
            StatusCode::BAD_REQUEST,
            "{\"error\":\"invalid character 'h' looking for beginning of value\"}\n",
        );
        assert!(
            matches!(err, StreamError::InvalidRequest(ref msg) if msg.ends_with("value\"}")),
            "got: {err:?}"
        );
    }

    #[test]
    fn server_side_failures_are_service_unavailable() {
        for code in [500u16, 502, 503, 599] {
            let status = StatusCode::from_u16(code).expect("valid status");
            let err = map_http_status(status, "llama runner process has terminated");
            assert!(
                matches!(err, StreamError::ServiceUnavailable(ref msg) if msg.contains("runner")),
                "status {code} mapped to {err:?}"
            );
        }
    }

    #[test]
    fn proxy_rejection_keeps_status_code() {
        let err = map_http_status(StatusCode::UNAUTHORIZED, "missing bearer token");
        let msg = err.to_string();
        assert!(msg.contains("401"), "{msg}");
        assert!(msg.contains("missing bearer token"), "{msg}");
    }

    #[test]
    fn prompt_file_error_names_path() {
        let err = StreamError::PromptFile {
            path: PathBuf::from("chatgpt.py"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("chatgpt.py"), "{msg}");
        assert!(msg.contains("no such file"), "{msg}");
    }

    #[test]
    fn decode_error_includes_line() {
        let source = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = StreamError::Decode {
            line: "nope".into(),
            source,
        };
        assert!(err.to_string().ends_with(": nope"));
    }
}
