//! WebSocket message types.
//!
//! The event payloads live in `agentpulse-protocol` so the dashboard and the
//! server agree on one definition.

use serde::Deserialize;

pub use agentpulse_protocol::WsEvent;

/// Query parameters of the push-channel upgrade request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsParams {
    #[serde(default)]
    pub session_id: Option<String>,
}

impl WsParams {
    /// The session id, if present and non-empty.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|id| !id.is_empty())
    }
}
