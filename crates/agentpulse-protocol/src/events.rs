//! Push-channel events (server -> browser).
//!
//! Delivery is best-effort. A client that reconnects gets a fresh `init`
//! snapshot and nothing else; deltas sent while it was away are not replayed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::agents::{AgentId, AgentState, Configured};
use crate::log::LogEntry;

/// Events sent to every connection subscribed to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsEvent {
    /// Full snapshot, sent once right after a connection is registered.
    Init {
        agents: BTreeMap<AgentId, AgentState>,
        logs: Vec<LogEntry>,
        configured: Configured,
    },

    /// Full current state of one agent after a mutation.
    AgentUpdate { data: AgentState },

    /// A newly appended log entry.
    Log { data: LogEntry },

    /// Session statistics were reset; discard local state and re-fetch.
    Reset,
}
