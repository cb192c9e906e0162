//! Session state: per-session agents, credentials and activity log.

pub mod log;
pub mod models;
pub mod store;

pub use log::{ActivityLog, DEFAULT_LOG_CAPACITY};
pub use models::{AgentModels, Credentials, Session};
pub use store::SessionStore;
