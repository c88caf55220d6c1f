//! HTTP API.
//!
//! ## Endpoints
//!
//! - `POST /chat` - Send a message, receive the agent's answer
//! - `GET /health` - Liveness check

mod chat;
mod routes;
pub mod types;

pub use chat::ApiError;
pub use routes::{router, serve, AppState};
