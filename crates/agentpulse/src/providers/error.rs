//! Provider client error types.

use serde::Deserialize;
use thiserror::Error;

/// Result type for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur while calling a model vendor.
///
/// The `Display` text is what the dashboard shows for a failed task.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The vendor rejected the request.
    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The vendor answered without any text.
    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),

    /// Failed to parse the response body.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// No client is registered for the agent.
    #[error("No provider registered for agent {0}")]
    Unavailable(String),
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Pull `error.message` out of a vendor error body.
///
/// Anthropic, OpenAI and Google all nest the message this way; anything else
/// is returned verbatim.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|w| w.error.message)
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_nested_message() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        assert_eq!(error_message(body), "invalid x-api-key");
    }

    #[test]
    fn falls_back_to_raw_body() {
        assert_eq!(error_message("  upstream timeout \n"), "upstream timeout");
    }

    #[test]
    fn api_error_display_names_provider_and_status() {
        let err = ProviderError::Api {
            provider: "OpenAI",
            status: 401,
            message: "Incorrect API key provided".into(),
        };
        assert_eq!(
            err.to_string(),
            "OpenAI API error (401): Incorrect API key provided"
        );
    }
}
