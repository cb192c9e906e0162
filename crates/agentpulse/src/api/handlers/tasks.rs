//! Task submission handlers.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use tracing::instrument;

use agentpulse_protocol::{AgentId, TaskOutcome, TaskRequest};

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

fn require_prompt(payload: Result<Json<TaskRequest>, JsonRejection>) -> ApiResult<String> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    request
        .prompt
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Prompt is required"))
}

/// Run a prompt against one agent.
///
/// Provider failures come back as a `success: false` outcome with status 200.
#[instrument(skip(state, payload))]
pub async fn submit_task(
    State(state): State<AppState>,
    Path((session_id, agent_id)): Path<(String, String)>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskOutcome>> {
    let prompt = require_prompt(payload)?;
    let agent: AgentId = agent_id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid agent"))?;

    let provider = agent.provider();
    let credential = state
        .store
        .credential(&session_id, provider)
        .ok_or_else(|| {
            ApiError::bad_request(format!("{} API key not configured", provider.label()))
        })?;

    let outcome = state
        .runner
        .run(&session_id, agent, &prompt, &credential)
        .await;
    Ok(Json(outcome))
}

/// Run a prompt against every agent with a stored credential, concurrently.
#[instrument(skip(state, payload))]
pub async fn submit_task_all(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> ApiResult<Json<BTreeMap<AgentId, TaskOutcome>>> {
    let prompt = require_prompt(payload)?;

    let targets = state.runner.configured_targets(&session_id);
    if targets.is_empty() {
        return Err(ApiError::bad_request("No API keys configured"));
    }

    let outcomes = state.runner.run_all(&session_id, &prompt, targets).await;
    Ok(Json(outcomes))
}
