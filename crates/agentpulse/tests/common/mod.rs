//! Test utilities and common setup.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use agentpulse::api::{self, AppState};
use agentpulse::config::ServerConfig;
use agentpulse::providers::{
    Completion, CompletionProvider, CompletionRequest, ProviderError, ProviderRegistry,
    ProviderResult, TokenUsage,
};
use agentpulse::runner::TaskRunner;
use agentpulse::session::SessionStore;
use agentpulse_protocol::AgentId;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

pub const ANTHROPIC_KEY: &str = "sk-ant-test-key";
pub const OPENAI_KEY: &str = "sk-test-key";
pub const GOOGLE_KEY: &str = "AIzaSyTestKeyThatIsLongEnough";

/// Provider stand-in that answers every prompt the same way.
pub struct FakeProvider {
    reply: Result<Completion, String>,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn answering(text: &str, usage: Option<(u64, u64)>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(Completion {
                text: text.to_string(),
                usage: usage.map(|(input, output)| TokenUsage { input, output }),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "Fake"
    }

    async fn complete(&self, _request: CompletionRequest<'_>) -> ProviderResult<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(completion) => Ok(completion.clone()),
            Err(message) => Err(ProviderError::Api {
                provider: "Fake",
                status: 401,
                message: message.clone(),
            }),
        }
    }
}

/// A router wired to fake providers, plus handles for inspecting state.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub claude: Arc<FakeProvider>,
    pub gpt4: Arc<FakeProvider>,
    pub gemini: Arc<FakeProvider>,
}

impl TestApp {
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.state.store
    }
}

/// Create a test application where every provider succeeds.
pub fn test_app() -> TestApp {
    test_app_with(
        FakeProvider::answering("Claude says hi", Some((10, 20))),
        FakeProvider::answering("GPT says hi", Some((12, 1))),
        FakeProvider::answering("Gemini says hi", None),
    )
}

/// Create a test application with the given providers.
pub fn test_app_with(
    claude: Arc<FakeProvider>,
    gpt4: Arc<FakeProvider>,
    gemini: Arc<FakeProvider>,
) -> TestApp {
    let registry = ProviderRegistry::new()
        .register(AgentId::Claude, claude.clone())
        .register(AgentId::Gpt4, gpt4.clone())
        .register(AgentId::Gemini, gemini.clone());
    let store = Arc::new(SessionStore::default());
    let state = AppState::new(TaskRunner::new(store, Arc::new(registry)));
    let router = api::create_router(state.clone(), &ServerConfig::default());

    TestApp {
        router,
        state,
        claude,
        gpt4,
        gemini,
    }
}

/// Send a request and decode the JSON body.
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::GET, uri, None).await
}

pub async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, uri, Some(body)).await
}
