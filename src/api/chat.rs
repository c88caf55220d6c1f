//! `POST /chat` - hand a message to the agent and return its answer.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::Instrument;
use uuid::Uuid;

use super::routes::AppState;
use super::types::{ChatRequest, ChatResponse, ErrorResponse};

/// Any failure while answering; always rendered as a 500 with a `detail` string.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = format!("{:#}", self.0);
        tracing::error!("Chat request failed: {}", detail);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { detail }),
        )
            .into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// POST /chat - Run the agent on a single message.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let span = tracing::info_span!("chat", request_id = %Uuid::new_v4());

    async move {
        tracing::info!("Received message ({} chars)", request.content.len());

        let output = state.agent.invoke(&request.content).await?;

        tracing::info!(
            "Answered after {} tool call(s)",
            output.intermediate_steps.len()
        );
        Ok::<_, ApiError>(Json(ChatResponse {
            response: output.output,
        }))
    }
    .instrument(span)
    .await
}
