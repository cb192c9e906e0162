//! HTTP API module.
//!
//! REST endpoints under `/api` plus the `/ws` push channel.

mod error;
pub mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
