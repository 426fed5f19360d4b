//! MockMate API server.
//!
//! Serves the interview platform's backend: a WebSocket stream that
//! turns camera frames into facial-signal classifications, question
//! retrieval from the on-disk bank, and Gemini-composed feedback for
//! spoken answers and non-verbal metrics.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod ws;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
