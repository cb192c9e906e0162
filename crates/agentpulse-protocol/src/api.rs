//! HTTP request and response bodies for the `/api` surface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::agents::{AgentId, AgentState, Configured, Provider};

/// Body of `POST /api/session/keys`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetKeysRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub api_keys: ApiKeys,
}

/// Provider credentials submitted by the browser. Absent or empty entries
/// leave the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google: Option<String>,
}

impl ApiKeys {
    /// The submitted key for `provider`, with empty strings treated as absent.
    pub fn get(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::Anthropic => self.anthropic.as_deref(),
            Provider::OpenAi => self.openai.as_deref(),
            Provider::Google => self.google.as_deref(),
        };
        key.filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetKeysResponse {
    pub success: bool,
    pub configured: Configured,
}

/// Body of `GET /api/session/{session_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub agents: BTreeMap<AgentId, AgentState>,
    pub configured: Configured,
}

/// Body of `POST /api/task/{session_id}/{agent_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Result of running one prompt against one agent.
///
/// Successful runs carry the response and accounting; failed runs carry only
/// the error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Wall-clock time of the provider call in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskOutcome {
    pub fn completed(response: String, tokens: u64, cost: f64, response_time: u64) -> Self {
        Self {
            success: true,
            response: Some(response),
            tokens: Some(tokens),
            cost: Some(cost),
            response_time: Some(response_time),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            tokens: None,
            cost: None,
            response_time: None,
            error: Some(error.into()),
        }
    }
}
