//! Wire types for AgentPulse.
//!
//! This crate defines the JSON shapes exchanged between the server and the
//! browser dashboard:
//!
//! ```text
//! Browser <--[WS: push events]-- Server --[HTTPS]--> Anthropic / OpenAI / Google
//!    |                             ^
//!    +------[HTTP: /api/*]---------+
//! ```
//!
//! Field names are camelCase on the wire. Agent-keyed maps are ordered by
//! [`AgentId`] declaration order (claude, gpt4, gemini).

pub mod agents;
pub mod api;
pub mod events;
pub mod log;

pub use agents::{AgentId, AgentState, AgentStatus, Configured, Provider, UnknownAgent};
pub use api::{ApiKeys, SessionSnapshot, SetKeysRequest, SetKeysResponse, TaskOutcome, TaskRequest};
pub use events::WsEvent;
pub use log::{LogEntry, LogKind};
