//! WebSocket hub for tracking browser connections and fanning out session events.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::types::WsEvent;

/// Size of the per-connection send buffer.
const CONNECTION_BUFFER_SIZE: usize = 64;

/// A sender for WebSocket events to a specific client.
pub type WsSender = mpsc::Sender<WsEvent>;

/// Identifies one registered connection.
pub type ConnectionId = u64;

/// WebSocket hub managing every browser connection, grouped by session.
///
/// The hub is responsible for:
/// - Tracking active WebSocket connections per session id
/// - Delivering events to every connection of a session
///
/// Delivery never blocks the caller. A connection whose buffer is full or
/// closed misses that event.
pub struct WsHub {
    /// Session ID -> (connection ID, sender) for each open connection
    connections: DashMap<String, Vec<(ConnectionId, WsSender)>>,

    next_id: AtomicU64,
}

impl WsHub {
    /// Create a new WebSocket hub.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new WebSocket connection for a session.
    ///
    /// Returns a receiver for events targeted at this connection and the connection ID.
    pub fn register_connection(&self, session_id: &str) -> (mpsc::Receiver<WsEvent>, ConnectionId) {
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER_SIZE);
        let conn_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.connections
            .entry(session_id.to_string())
            .or_default()
            .push((conn_id, tx));
        info!(
            "Registered WebSocket connection {} for session {}",
            conn_id, session_id
        );
        (rx, conn_id)
    }

    /// Unregister a WebSocket connection.
    pub fn unregister_connection(&self, session_id: &str, conn_id: ConnectionId) {
        if let Some(mut conns) = self.connections.get_mut(session_id) {
            conns.retain(|(id, _)| *id != conn_id);
            info!(
                "Unregistered WebSocket connection {} for session {}",
                conn_id, session_id
            );
        }

        // Clean up empty entries
        self.connections.remove_if(session_id, |_, v| v.is_empty());
    }

    /// Send an event to all connections of a session.
    pub fn broadcast(&self, session_id: &str, event: WsEvent) {
        let Some(conns) = self.connections.get(session_id) else {
            return;
        };

        for (conn_id, tx) in conns.iter() {
            match tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(
                        "Dropping event for session {} connection {}: buffer full",
                        session_id, conn_id
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(
                        "Connection {} for session {} already closed",
                        conn_id, session_id
                    );
                }
            }
        }
    }

    /// Number of open connections for a session.
    pub fn connection_count(&self, session_id: &str) -> usize {
        self.connections
            .get(session_id)
            .map(|c| c.len())
            .unwrap_or(0)
    }
}

impl Default for WsHub {
    fn default() -> Self {
        Self::new()
    }
}
