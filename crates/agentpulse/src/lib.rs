//! AgentPulse server library.
//!
//! A dashboard backend that relays prompts to Anthropic, OpenAI and Google on
//! behalf of browser sessions, tracks per-agent usage and cost, and pushes
//! every state change to the session's open WebSocket connections.

pub mod api;
pub mod config;
pub mod providers;
pub mod reaper;
pub mod runner;
pub mod session;
pub mod ws;
