//! Reaction handlers
//!
//! Row reads for the client-side aggregate cache, a server-side summary,
//! and the idempotent insert/delete pair behind toggles.

use axum::{extract::State, Json};
use hearth_service::dto::{ReactionResponse, ReactionSummaryResponse};
use hearth_service::ReactionService;

use crate::extractors::{AuthUser, IdPath, OptionalAuthUser, ReactionPath};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// GET /stories/{story_id}/reactions
pub async fn list_reactions(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    IdPath(story_id): IdPath,
) -> ApiResult<Json<Vec<ReactionResponse>>> {
    let rows = ReactionService::new(state.service_context())
        .list(story_id, viewer.user_id())
        .await?;
    Ok(Json(rows))
}

/// GET /stories/{story_id}/reactions/@me
pub async fn my_reactions(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(story_id): IdPath,
) -> ApiResult<Json<Vec<ReactionResponse>>> {
    let rows = ReactionService::new(state.service_context())
        .mine(story_id, auth.user_id)
        .await?;
    Ok(Json(rows))
}

/// GET /stories/{story_id}/reactions/summary
pub async fn reaction_summary(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    IdPath(story_id): IdPath,
) -> ApiResult<Json<ReactionSummaryResponse>> {
    let summary = ReactionService::new(state.service_context())
        .summary(story_id, viewer.user_id())
        .await?;
    Ok(Json(summary))
}

/// PUT /stories/{story_id}/reactions/{kind}/@me
pub async fn add_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    path: ReactionPath,
) -> ApiResult<NoContent> {
    ReactionService::new(state.service_context())
        .add(path.story_id, auth.user_id, path.kind)
        .await?;
    Ok(NoContent)
}

/// DELETE /stories/{story_id}/reactions/{kind}/@me
pub async fn remove_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    path: ReactionPath,
) -> ApiResult<NoContent> {
    ReactionService::new(state.service_context())
        .remove(path.story_id, auth.user_id, path.kind)
        .await?;
    Ok(NoContent)
}
