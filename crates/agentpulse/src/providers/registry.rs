//! Agent -> provider lookup table.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use agentpulse_protocol::AgentId;
use reqwest::Client;

use super::{
    AnthropicClient, CompletionProvider, GeminiClient, OpenAiClient, Pricing, ProviderResult,
    anthropic, gemini, openai,
};

/// A provider client together with the rate card used to bill it.
#[derive(Clone)]
pub struct RegisteredProvider {
    pub client: Arc<dyn CompletionProvider>,
    pub pricing: Pricing,
}

/// Maps each agent to the client that serves it.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    entries: BTreeMap<AgentId, RegisteredProvider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the three vendor clients sharing one HTTP client.
    pub fn with_base_urls(
        timeout: Duration,
        anthropic_url: impl Into<String>,
        openai_url: impl Into<String>,
        google_url: impl Into<String>,
    ) -> ProviderResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self::new()
            .register(
                AgentId::Claude,
                Arc::new(AnthropicClient::new(client.clone(), anthropic_url)),
            )
            .register(
                AgentId::Gpt4,
                Arc::new(OpenAiClient::new(client.clone(), openai_url)),
            )
            .register(
                AgentId::Gemini,
                Arc::new(GeminiClient::new(client, google_url)),
            ))
    }

    /// Registry pointing at the public vendor endpoints.
    pub fn with_defaults(timeout: Duration) -> ProviderResult<Self> {
        Self::with_base_urls(
            timeout,
            anthropic::DEFAULT_BASE_URL,
            openai::DEFAULT_BASE_URL,
            gemini::DEFAULT_BASE_URL,
        )
    }

    /// Register a client for `agent` with the agent's standard rate card.
    pub fn register(mut self, agent: AgentId, client: Arc<dyn CompletionProvider>) -> Self {
        let pricing = Pricing::for_agent(agent);
        self.entries
            .insert(agent, RegisteredProvider { client, pricing });
        self
    }

    pub fn get(&self, agent: AgentId) -> Option<&RegisteredProvider> {
        self.entries.get(&agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_agent() {
        let registry = ProviderRegistry::with_defaults(Duration::from_secs(5)).unwrap();
        for agent in AgentId::ALL {
            let entry = registry.get(agent).expect("registered");
            assert_eq!(entry.client.name(), agent.provider().label());
            assert_eq!(entry.pricing, Pricing::for_agent(agent));
        }
    }

    #[test]
    fn empty_registry_has_no_entries() {
        assert!(ProviderRegistry::new().get(AgentId::Claude).is_none());
    }
}
