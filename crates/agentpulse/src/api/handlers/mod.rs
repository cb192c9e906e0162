//! API request handlers.

mod misc;
mod sessions;
mod tasks;

pub use misc::{HealthResponse, health};
pub use sessions::{ResetResponse, get_logs, get_session, reset_session, set_keys, validate_api_key};
pub use tasks::{submit_task, submit_task_all};
