//! WebSocket push channel.
//!
//! Browsers connect with their session id and receive an `init` snapshot
//! followed by every state delta for that session.

pub mod handler;
pub mod hub;
pub mod types;

pub use handler::ws_handler;
pub use hub::WsHub;
pub use types::{WsEvent, WsParams};
