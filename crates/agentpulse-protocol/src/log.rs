//! Activity log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    #[default]
    Info,
    Error,
}

/// One line of a session's activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    /// Agent display name, or `System`.
    pub agent: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: LogKind,
}

impl LogEntry {
    pub fn new(agent: impl Into<String>, message: impl Into<String>, kind: LogKind) -> Self {
        Self {
            timestamp: Utc::now(),
            agent: agent.into(),
            message: message.into(),
            kind,
        }
    }
}
