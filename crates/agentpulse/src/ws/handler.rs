//! WebSocket handler for browser connections.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::time::{Instant, interval_at};

use crate::api::AppState;
use crate::session::SessionStore;

use super::hub::WsHub;
use super::types::WsParams;

/// Ping interval for keepalive.
const PING_INTERVAL_SECS: u64 = 30;

/// WebSocket upgrade handler.
///
/// GET /ws?sessionId=<id>
///
/// Connections without a session id are accepted and closed straight away.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(session_id) = params.session_id().map(str::to_string) else {
        debug!("WebSocket upgrade without session id, closing");
        return ws.on_upgrade(|mut socket| async move {
            let _ = socket.send(Message::Close(None)).await;
        });
    };

    info!("WebSocket upgrade request for session {}", session_id);
    let hub = state.ws_hub.clone();
    let store = state.store.clone();
    ws.on_upgrade(move |socket| handle_ws_connection(socket, hub, store, session_id))
}

/// Handle a WebSocket connection.
async fn handle_ws_connection(
    socket: WebSocket,
    hub: Arc<WsHub>,
    store: Arc<SessionStore>,
    session_id: String,
) {
    let (mut sender, mut receiver) = socket.split();

    // Register before taking the snapshot so no delta falls in between.
    let (mut event_rx, conn_id) = hub.register_connection(&session_id);

    let init_json = match serde_json::to_string(&store.init_event(&session_id)) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize init event for {}: {}", session_id, e);
            hub.unregister_connection(&session_id, conn_id);
            return;
        }
    };

    if let Err(e) = sender.send(Message::Text(init_json.into())).await {
        error!("Failed to send init message to session {}: {}", session_id, e);
        hub.unregister_connection(&session_id, conn_id);
        return;
    }

    let send_task = tokio::spawn(async move {
        let period = Duration::from_secs(PING_INTERVAL_SECS);
        let mut ping_interval = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                event = event_rx.recv() => {
                    let Some(event) = event else { break };
                    let json = match serde_json::to_string(&event) {
                        Ok(j) => j,
                        Err(e) => {
                            warn!("Failed to serialize event: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }

                _ = ping_interval.tick() => {
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // The dashboard never sends commands; only watch for close.
    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(Message::Close(_)) => {
                info!("Session {} closed WebSocket connection", session_id);
                break;
            }
            Ok(Message::Pong(_)) => {
                debug!("Received pong from session {}", session_id);
            }
            Ok(_) => {
                debug!("Ignoring client message from session {}", session_id);
            }
            Err(e) => {
                warn!("WebSocket error for session {}: {}", session_id, e);
                break;
            }
        }
    }

    send_task.abort();
    hub.unregister_connection(&session_id, conn_id);
    info!("WebSocket connection closed for session {}", session_id);
}
