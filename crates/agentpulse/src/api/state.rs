//! Application state shared across handlers.

use std::sync::Arc;

use crate::runner::TaskRunner;
use crate::session::SessionStore;
use crate::ws::WsHub;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Per-session agents, credentials and logs.
    pub store: Arc<SessionStore>,
    /// Runs prompts against the configured providers.
    pub runner: Arc<TaskRunner>,
    /// WebSocket hub for pushing session deltas.
    pub ws_hub: Arc<WsHub>,
}

impl AppState {
    /// Build state around a runner; the store and hub are taken from it.
    pub fn new(runner: TaskRunner) -> Self {
        let store = runner.store().clone();
        let ws_hub = store.hub().clone();
        Self {
            store,
            runner: Arc::new(runner),
            ws_hub,
        }
    }
}
