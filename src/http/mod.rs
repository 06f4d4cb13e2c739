//! HTTP API server for the interview controls
//!
//! This module provides the REST surface the candidate screen drives:
//! - POST /session/start - Start the interview session
//! - POST /session/speak - Toggle the microphone
//! - POST /session/end - End the session
//! - POST /session/acknowledge - Dismiss the end-of-session report
//! - GET /session/status - Engine snapshot (violations, timer, activity)
//! - GET /session/report - The frozen session report
//! - POST /resume, DELETE /resume - Resume document management
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
