//! OpenAI Chat Completions client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    Completion, CompletionProvider, CompletionRequest, ProviderError, ProviderResult, TokenUsage,
    send_json,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const NAME: &str = "OpenAI";

/// Client for `POST /v1/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> ProviderResult<Completion> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt,
            }],
            max_tokens: request.max_tokens,
        };

        let response: ChatResponse = send_json(
            NAME,
            self.client
                .post(url)
                .bearer_auth(request.api_key)
                .json(&body),
        )
        .await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyResponse(NAME))?;

        Ok(Completion {
            text,
            usage: Some(TokenUsage {
                input: response.usage.prompt_tokens,
                output: response.usage.completion_tokens,
            }),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Usage,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request<'a>(prompt: &'a str) -> CompletionRequest<'a> {
        CompletionRequest {
            api_key: "sk-test",
            model: "gpt-4-turbo-preview",
            prompt,
            max_tokens: 1024,
        }
    }

    #[tokio::test]
    async fn returns_first_choice_and_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4-turbo-preview",
                "max_tokens": 1024
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "4"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 1, "total_tokens": 13}
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(Client::new(), server.uri());
        let completion = client.complete(request("2+2?")).await.unwrap();

        assert_eq!(completion.text, "4");
        assert_eq!(completion.usage.map(|u| u.total()), Some(13));
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [],
                "usage": {"prompt_tokens": 1, "completion_tokens": 0}
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(Client::new(), server.uri());
        let err = client.complete(request("hi")).await.unwrap_err();

        assert!(matches!(err, ProviderError::EmptyResponse("OpenAI")));
    }

    #[tokio::test]
    async fn rate_limit_surfaces_vendor_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "Rate limit reached", "type": "requests"}
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(Client::new(), server.uri());
        let err = client.complete(request("hi")).await.unwrap_err();

        assert_eq!(err.to_string(), "OpenAI API error (429): Rate limit reached");
    }
}
