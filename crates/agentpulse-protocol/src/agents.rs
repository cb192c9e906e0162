//! Agent identity and per-agent usage state.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Identity
// ============================================================================

/// One of the three built-in agents.
///
/// The set is closed. Variant order is the display order and the key order of
/// every agent-keyed map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentId {
    Claude,
    Gpt4,
    Gemini,
}

impl AgentId {
    pub const ALL: [AgentId; 3] = [AgentId::Claude, AgentId::Gpt4, AgentId::Gemini];

    pub fn as_str(self) -> &'static str {
        match self {
            AgentId::Claude => "claude",
            AgentId::Gpt4 => "gpt4",
            AgentId::Gemini => "gemini",
        }
    }

    /// Human-readable name shown on the dashboard card.
    pub fn display_name(self) -> &'static str {
        match self {
            AgentId::Claude => "Claude Sonnet 4",
            AgentId::Gpt4 => "GPT-4 Turbo",
            AgentId::Gemini => "Gemini Pro",
        }
    }

    /// Vendor whose API serves this agent.
    pub fn provider(self) -> Provider {
        match self {
            AgentId::Claude => Provider::Anthropic,
            AgentId::Gpt4 => Provider::OpenAi,
            AgentId::Gemini => Provider::Google,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            AgentId::Claude => "claude-sonnet-4-20250514",
            AgentId::Gpt4 => "gpt-4-turbo-preview",
            AgentId::Gemini => "gemini-pro",
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a string that names no built-in agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAgent(pub String);

impl fmt::Display for UnknownAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown agent: {}", self.0)
    }
}

impl std::error::Error for UnknownAgent {}

impl FromStr for AgentId {
    type Err = UnknownAgent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownAgent(s.to_string()))
    }
}

/// Model vendor. Credentials are stored per provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAi,
    Google,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Anthropic, Provider::OpenAi, Provider::Google];

    /// Vendor label, also used as the agent "type" on the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            Provider::Anthropic => "Anthropic",
            Provider::OpenAi => "OpenAI",
            Provider::Google => "Google",
        }
    }

    /// The agent bound to this provider.
    pub fn agent(self) -> AgentId {
        match self {
            Provider::Anthropic => AgentId::Claude,
            Provider::OpenAi => AgentId::Gpt4,
            Provider::Google => AgentId::Gemini,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// State
// ============================================================================

/// Agent activity status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Idle,
    Working,
    /// Accepted on the wire for dashboard compatibility; the server never
    /// transitions an agent into it.
    Active,
}

/// Usage statistics and live status of one agent within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentState {
    pub id: AgentId,
    pub name: String,
    #[serde(rename = "type")]
    pub agent_type: String,
    pub status: AgentStatus,
    pub current_task: Option<String>,
    pub tasks_completed: u64,
    pub tokens_used: u64,
    pub total_cost: f64,
    pub last_active: Option<DateTime<Utc>>,
    pub model: String,
}

impl AgentState {
    /// Fresh idle state with zeroed counters.
    pub fn new(id: AgentId, model: impl Into<String>) -> Self {
        Self {
            id,
            name: id.display_name().to_string(),
            agent_type: id.provider().label().to_string(),
            status: AgentStatus::Idle,
            current_task: None,
            tasks_completed: 0,
            tokens_used: 0,
            total_cost: 0.0,
            last_active: None,
            model: model.into(),
        }
    }
}

/// Which agents have a stored credential. Keyed by agent id on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Configured {
    pub claude: bool,
    pub gpt4: bool,
    pub gemini: bool,
}

impl Configured {
    pub fn set(&mut self, agent: AgentId, value: bool) {
        match agent {
            AgentId::Claude => self.claude = value,
            AgentId::Gpt4 => self.gpt4 = value,
            AgentId::Gemini => self.gemini = value,
        }
    }

    pub fn any(&self) -> bool {
        self.claude || self.gpt4 || self.gemini
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn agent_ids_parse_and_reject_unknown() {
        assert_eq!("gpt4".parse::<AgentId>(), Ok(AgentId::Gpt4));
        assert_eq!(
            "all".parse::<AgentId>(),
            Err(UnknownAgent("all".to_string()))
        );
    }

    #[test]
    fn agent_state_uses_camel_case_and_type_field() {
        let state = AgentState::new(AgentId::Claude, "claude-sonnet-4-20250514");
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["id"], "claude");
        assert_eq!(json["type"], "Anthropic");
        assert_eq!(json["status"], "idle");
        assert_eq!(json["tasksCompleted"], 0);
        assert!(json["currentTask"].is_null());
        assert!(json["lastActive"].is_null());
    }

    #[test]
    fn agent_keyed_maps_serialize_in_declaration_order() {
        let map: BTreeMap<AgentId, u8> = [(AgentId::Gemini, 3), (AgentId::Claude, 1), (AgentId::Gpt4, 2)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"claude":1,"gpt4":2,"gemini":3}"#);
    }

    #[test]
    fn provider_maps_to_agent() {
        for provider in Provider::ALL {
            assert_eq!(provider.agent().provider(), provider);
        }
        assert_eq!(serde_json::to_value(Provider::OpenAi).unwrap(), "openai");
    }
}
