//! Session credential, snapshot, log and reset handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Serialize;
use tracing::{info, instrument};

use agentpulse_protocol::{
    LogEntry, LogKind, Provider, SessionSnapshot, SetKeysRequest, SetKeysResponse,
};

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// Log label for events not tied to an agent.
const SYSTEM_LABEL: &str = "System";

/// Minimum length, exclusive, of a Google API key.
const GOOGLE_KEY_MIN_LEN: usize = 20;

/// Shape check for a provider API key. Nothing is sent to the vendor.
pub fn validate_api_key(provider: Provider, key: &str) -> bool {
    match provider {
        Provider::Anthropic => key.starts_with("sk-ant-"),
        Provider::OpenAi => key.starts_with("sk-"),
        Provider::Google => key.chars().count() > GOOGLE_KEY_MIN_LEN,
    }
}

/// Store API keys for a session.
///
/// Every submitted key is validated before any is stored, so a rejected
/// request leaves the session untouched.
#[instrument(skip(state, payload))]
pub async fn set_keys(
    State(state): State<AppState>,
    payload: Result<Json<SetKeysRequest>, JsonRejection>,
) -> ApiResult<Json<SetKeysResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let session_id = request
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Session ID required"))?;

    let mut accepted = Vec::new();
    for provider in Provider::ALL {
        if let Some(key) = request.api_keys.get(provider) {
            if !validate_api_key(provider, key) {
                return Err(ApiError::bad_request(format!(
                    "Invalid {} API key",
                    provider.label()
                )));
            }
            accepted.push((provider, key.to_string()));
        }
    }

    let providers: Vec<_> = accepted.iter().map(|(p, _)| p.label()).collect();
    let configured = state.store.set_credentials(&session_id, accepted);
    state
        .store
        .append_log(&session_id, SYSTEM_LABEL, "API keys updated", LogKind::Info);
    info!(session_id = %session_id, ?providers, "Stored API keys");

    Ok(Json(SetKeysResponse {
        success: true,
        configured,
    }))
}

/// Agents and credential flags for a session.
#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<SessionSnapshot> {
    Json(state.store.snapshot(&session_id))
}

/// Activity log for a session, newest first.
#[instrument(skip(state))]
pub async fn get_logs(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Vec<LogEntry>> {
    Json(state.store.log().entries(&session_id))
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
}

/// Zero every agent's statistics and clear the log.
#[instrument(skip(state))]
pub async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<ResetResponse> {
    state.store.reset(&session_id);
    Json(ResetResponse { success: true })
}
