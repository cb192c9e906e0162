//! Process-wide session store.

use std::sync::Arc;

use agentpulse_protocol::{
    AgentId, AgentState, Configured, LogEntry, LogKind, Provider, SessionSnapshot,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::info;

use super::log::ActivityLog;
use super::models::{AgentModels, Session};
use crate::ws::{WsEvent, WsHub};

/// Owns every [`Session`] and its activity log.
///
/// Sessions are created lazily on first reference, so every operation is
/// total over the session id. Mutations are synchronous and push the
/// resulting delta to the session's connections.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    log: ActivityLog,
    models: AgentModels,
    hub: Arc<WsHub>,
}

impl SessionStore {
    pub fn new(hub: Arc<WsHub>, models: AgentModels, log_capacity: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            log: ActivityLog::new(hub.clone(), log_capacity),
            models,
            hub,
        }
    }

    pub fn hub(&self) -> &Arc<WsHub> {
        &self.hub
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    /// Get a copy of the session, creating the default three-agent state if needed.
    pub fn get_or_create(&self, session_id: &str) -> Session {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(&self.models))
            .clone()
    }

    pub fn snapshot(&self, session_id: &str) -> SessionSnapshot {
        let session = self.get_or_create(session_id);
        SessionSnapshot {
            configured: session.credentials.configured(),
            agents: session.agents,
        }
    }

    /// Agents, log and credential flags in one message for a new connection.
    pub fn init_event(&self, session_id: &str) -> WsEvent {
        let snapshot = self.snapshot(session_id);
        WsEvent::Init {
            agents: snapshot.agents,
            logs: self.log.entries(session_id),
            configured: snapshot.configured,
        }
    }

    pub fn agent(&self, session_id: &str, agent: AgentId) -> AgentState {
        let mut session = self.get_or_create(session_id);
        session
            .agents
            .remove(&agent)
            .unwrap_or_else(|| AgentState::new(agent, self.models.model(agent)))
    }

    /// Apply `f` to one agent's state as a single mutation, then push the
    /// merged state to the session's connections.
    pub fn update_agent(
        &self,
        session_id: &str,
        agent: AgentId,
        f: impl FnOnce(&mut AgentState),
    ) -> AgentState {
        let mut session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(&self.models));
        let state = session
            .agents
            .entry(agent)
            .or_insert_with(|| AgentState::new(agent, self.models.model(agent)));
        f(state);
        let updated = state.clone();

        // Broadcast under the entry lock so deltas leave in the order applied.
        self.hub.broadcast(
            session_id,
            WsEvent::AgentUpdate {
                data: updated.clone(),
            },
        );
        updated
    }

    /// Append to the session's activity log.
    pub fn append_log(
        &self,
        session_id: &str,
        agent: &str,
        message: impl Into<String>,
        kind: LogKind,
    ) -> LogEntry {
        self.log.append(session_id, agent, message, kind)
    }

    /// Store already-validated credentials. Providers not listed keep their value.
    pub fn set_credentials(
        &self,
        session_id: &str,
        keys: impl IntoIterator<Item = (Provider, String)>,
    ) -> Configured {
        let mut session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(&self.models));
        for (provider, key) in keys {
            session.credentials.set(provider, key);
        }
        session.credentials.configured()
    }

    pub fn credential(&self, session_id: &str, provider: Provider) -> Option<String> {
        self.get_or_create(session_id)
            .credentials
            .get(provider)
            .map(str::to_string)
    }

    pub fn configured(&self, session_id: &str) -> Configured {
        self.get_or_create(session_id).credentials.configured()
    }

    /// Zero every agent's counters, clear the log, and tell connected
    /// browsers to resync. Credentials are kept.
    pub fn reset(&self, session_id: &str) {
        let mut session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(&self.models));
        session.reset_agents();
        self.log.clear(session_id);
        self.hub.broadcast(session_id, WsEvent::Reset);
        drop(session);
        info!("Reset session {}", session_id);
    }

    /// Most recent `last_active` across the session's agents.
    pub fn last_active(&self, session_id: &str) -> Option<DateTime<Utc>> {
        self.sessions.get(session_id).and_then(|s| s.last_active())
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop the session and its log.
    pub fn evict(&self, session_id: &str) -> bool {
        self.evict_if(session_id, |_| true)
    }

    /// Drop the session and its log if `predicate` holds, checked under the
    /// entry lock.
    pub fn evict_if(&self, session_id: &str, predicate: impl FnOnce(&Session) -> bool) -> bool {
        let removed = self
            .sessions
            .remove_if(session_id, |_, session| predicate(session))
            .is_some();
        if removed {
            self.log.remove(session_id);
        }
        removed
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(
            Arc::new(WsHub::new()),
            AgentModels::default(),
            super::log::DEFAULT_LOG_CAPACITY,
        )
    }
}
