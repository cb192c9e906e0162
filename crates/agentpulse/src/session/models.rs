//! Session data models.

use std::collections::BTreeMap;
use std::fmt;

use agentpulse_protocol::{AgentId, AgentState, AgentStatus, Configured, Provider};
use chrono::{DateTime, Utc};

/// Model name used for each agent when a session is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentModels(BTreeMap<AgentId, String>);

impl AgentModels {
    pub fn new(models: BTreeMap<AgentId, String>) -> Self {
        Self(models)
    }

    pub fn model(&self, agent: AgentId) -> &str {
        self.0
            .get(&agent)
            .map(String::as_str)
            .unwrap_or_else(|| agent.default_model())
    }

    /// Override one agent's model.
    pub fn with_model(mut self, agent: AgentId, model: impl Into<String>) -> Self {
        self.0.insert(agent, model.into());
        self
    }
}

impl Default for AgentModels {
    fn default() -> Self {
        Self(
            AgentId::ALL
                .into_iter()
                .map(|id| (id, id.default_model().to_string()))
                .collect(),
        )
    }
}

/// Stored provider API keys. `Debug` never prints key material.
#[derive(Clone, Default)]
pub struct Credentials(BTreeMap<Provider, String>);

impl Credentials {
    pub fn get(&self, provider: Provider) -> Option<&str> {
        self.0.get(&provider).map(String::as_str)
    }

    pub fn set(&mut self, provider: Provider, key: String) {
        self.0.insert(provider, key);
    }

    /// Presence flags keyed by the agent each provider serves.
    pub fn configured(&self) -> Configured {
        let mut configured = Configured::default();
        for provider in self.0.keys() {
            configured.set(provider.agent(), true);
        }
        configured
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// In-memory state of one browser session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Always contains every [`AgentId`].
    pub agents: BTreeMap<AgentId, AgentState>,
    pub credentials: Credentials,
}

impl Session {
    pub fn new(models: &AgentModels) -> Self {
        let agents = AgentId::ALL
            .into_iter()
            .map(|id| (id, AgentState::new(id, models.model(id))))
            .collect();
        Self {
            agents,
            credentials: Credentials::default(),
        }
    }

    /// Most recent `last_active` across the agents.
    pub fn last_active(&self) -> Option<DateTime<Utc>> {
        self.agents.values().filter_map(|a| a.last_active).max()
    }

    /// Zero every agent's counters and clear in-flight work.
    ///
    /// Entries, models and `last_active` are kept.
    pub fn reset_agents(&mut self) {
        for agent in self.agents.values_mut() {
            agent.status = AgentStatus::Idle;
            agent.current_task = None;
            agent.tasks_completed = 0;
            agent.tokens_used = 0;
            agent.total_cost = 0.0;
        }
    }
}
