//! Chat endpoint

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ChatRequest, ChatResponse, Json};

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }

    let ctx = request.context();
    debug!(usecase = %ctx.usecase(), history = request.history.len(), "Chat request");

    let reply = state
        .responder
        .respond(&ctx, &request.conversation())
        .await?;

    Ok(Json(reply))
}
