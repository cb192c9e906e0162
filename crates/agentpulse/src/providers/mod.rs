//! Model vendor clients.
//!
//! Each vendor implements [`CompletionProvider`]: one prompt in, one text
//! answer (plus token usage when the vendor reports it) out. The
//! [`ProviderRegistry`] maps each agent to its client and rate card.

pub mod anthropic;
mod error;
pub mod gemini;
pub mod openai;
mod pricing;
mod registry;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub use anthropic::AnthropicClient;
pub use error::{ProviderError, ProviderResult};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use pricing::{Charge, Pricing, estimate_tokens};
pub use registry::{ProviderRegistry, RegisteredProvider};

/// Fixed output ceiling for every completion.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// A single-turn completion request.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub api_key: &'a str,
    pub model: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
}

/// Token counts reported by the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input + self.output
    }
}

/// The vendor's answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    /// `None` when the vendor response carries no usage metadata.
    pub usage: Option<TokenUsage>,
}

/// A model vendor that can answer a prompt.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Vendor label used in error messages.
    fn name(&self) -> &'static str;

    async fn complete(&self, request: CompletionRequest<'_>) -> ProviderResult<Completion>;
}

/// Send a request and decode a JSON body, mapping non-2xx answers to
/// [`ProviderError::Api`].
async fn send_json<T: DeserializeOwned>(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> ProviderResult<T> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::Api {
            provider,
            status: status.as_u16(),
            message: error::error_message(&body),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| ProviderError::Parse(format!("{provider} response: {e}")))
}
