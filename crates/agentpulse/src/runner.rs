//! Runs prompts against agents and keeps their statistics.
//!
//! Every vendor goes through the same workflow: mark the agent working, log
//! the start, call the provider, bill the completion, then mark the agent idle
//! and log the outcome. Vendor differences live behind
//! [`CompletionProvider`](crate::providers::CompletionProvider) and
//! [`Pricing`](crate::providers::Pricing).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use agentpulse_protocol::{AgentId, AgentStatus, LogKind, TaskOutcome};
use chrono::Utc;
use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::providers::{
    Charge, CompletionRequest, DEFAULT_MAX_TOKENS, ProviderError, ProviderRegistry,
    ProviderResult,
};
use crate::session::SessionStore;

/// Characters of the prompt shown in the "started" log line.
const PROMPT_PREVIEW_CHARS: usize = 50;

pub struct TaskRunner {
    store: Arc<SessionStore>,
    providers: Arc<ProviderRegistry>,
    max_tokens: u32,
}

impl TaskRunner {
    pub fn new(store: Arc<SessionStore>, providers: Arc<ProviderRegistry>) -> Self {
        Self {
            store,
            providers,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Every agent whose provider has a stored credential, with that credential.
    pub fn configured_targets(&self, session_id: &str) -> Vec<(AgentId, String)> {
        AgentId::ALL
            .into_iter()
            .filter_map(|agent| {
                self.store
                    .credential(session_id, agent.provider())
                    .map(|key| (agent, key))
            })
            .collect()
    }

    /// Run one prompt against one agent.
    ///
    /// Provider failures are reported in the outcome and never propagate.
    #[instrument(skip(self, agent, prompt, credential), fields(agent = %agent))]
    pub async fn run(
        &self,
        session_id: &str,
        agent: AgentId,
        prompt: &str,
        credential: &str,
    ) -> TaskOutcome {
        let label = agent.display_name();
        let state = self.store.update_agent(session_id, agent, |a| {
            a.status = AgentStatus::Working;
            a.current_task = Some(prompt.to_string());
        });
        self.store.append_log(
            session_id,
            label,
            format!("Task started: {}", truncate_prompt(prompt)),
            LogKind::Info,
        );

        let started = Instant::now();
        let result = self.call(agent, &state.model, prompt, credential).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok((text, charge)) => {
                self.store.update_agent(session_id, agent, |a| {
                    a.status = AgentStatus::Idle;
                    a.current_task = None;
                    a.tasks_completed += 1;
                    a.tokens_used += charge.tokens;
                    a.total_cost += charge.cost;
                    a.last_active = Some(Utc::now());
                });
                self.store.append_log(
                    session_id,
                    label,
                    completed_message(elapsed_ms, &charge),
                    LogKind::Info,
                );
                info!(
                    session_id,
                    tokens = charge.tokens,
                    elapsed_ms,
                    "Task completed"
                );
                TaskOutcome::completed(text, charge.tokens, charge.cost, elapsed_ms)
            }
            Err(e) => {
                let message = e.to_string();
                self.store.update_agent(session_id, agent, |a| {
                    a.status = AgentStatus::Idle;
                    a.current_task = None;
                });
                self.store
                    .append_log(session_id, label, format!("Error: {message}"), LogKind::Error);
                warn!(session_id, elapsed_ms, error = %message, "Task failed");
                TaskOutcome::failed(message)
            }
        }
    }

    /// Run the prompt against every target concurrently.
    ///
    /// One agent failing does not affect the others. The result has an entry
    /// for each target and nothing else.
    pub async fn run_all(
        &self,
        session_id: &str,
        prompt: &str,
        targets: Vec<(AgentId, String)>,
    ) -> BTreeMap<AgentId, TaskOutcome> {
        let runs = targets.into_iter().map(|(agent, credential)| async move {
            let outcome = self.run(session_id, agent, prompt, &credential).await;
            (agent, outcome)
        });
        join_all(runs).await.into_iter().collect()
    }

    async fn call(
        &self,
        agent: AgentId,
        model: &str,
        prompt: &str,
        credential: &str,
    ) -> ProviderResult<(String, Charge)> {
        let entry = self
            .providers
            .get(agent)
            .ok_or_else(|| ProviderError::Unavailable(agent.to_string()))?;

        let completion = entry
            .client
            .complete(CompletionRequest {
                api_key: credential,
                model,
                prompt,
                max_tokens: self.max_tokens,
            })
            .await?;
        let charge = entry.pricing.charge(prompt, &completion)?;
        Ok((completion.text, charge))
    }
}

/// First 50 characters of the prompt, with `...` appended when cut.
pub fn truncate_prompt(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let preview: String = chars.by_ref().take(PROMPT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{preview}...")
    } else {
        preview
    }
}

fn completed_message(elapsed_ms: u64, charge: &Charge) -> String {
    let approx = if charge.estimated { "~" } else { "" };
    format!(
        "Completed in {elapsed_ms}ms | Tokens: {approx}{} | Cost: ${:.4}",
        charge.tokens, charge.cost
    )
}
