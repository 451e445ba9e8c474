//! Chat proxy handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use hearth_service::dto::{ChatRequest, ChatResponse};
use hearth_service::{ChatError, ChatService};

use crate::response::ApiResult;
use crate::state::AppState;

/// POST /chat
///
/// A body that is not a conversation is reported with the fixed chat
/// validation message rather than a generic body error.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let Json(request) = body.map_err(|e| {
        tracing::debug!(error = %e, "Unreadable chat body");
        ChatError::InvalidMessages
    })?;

    let response = ChatService::new(state.service_context()).reply(request).await?;
    Ok(Json(response))
}
