//! Router construction and server startup.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::chat;
use super::types::HealthResponse;
use crate::agent::{Agent, AgentExecutor};
use crate::config::Config;

/// Shared application state.
pub struct AppState {
    pub agent: Arc<dyn AgentExecutor>,
}

impl AppState {
    pub fn new(agent: Arc<dyn AgentExecutor>) -> Self {
        Self { agent }
    }
}

/// Build the application router around any agent engine.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat::chat))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the agent from configuration and serve until the process exits.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let agent = Agent::from_config(&config).await;
    let state = Arc::new(AppState::new(Arc::new(agent)));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// GET /health - Liveness check.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
