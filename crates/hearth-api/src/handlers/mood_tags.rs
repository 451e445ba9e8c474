//! Mood tag handlers

use axum::{extract::State, Json};
use hearth_service::dto::{CreateMoodTagRequest, MoodTagResponse, UpdateMoodTagRequest};
use hearth_service::MoodTagService;

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /mood-tags
pub async fn list_mood_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<MoodTagResponse>>> {
    let tags = MoodTagService::new(state.service_context()).list().await?;
    Ok(Json(tags))
}

/// POST /mood-tags
pub async fn create_mood_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateMoodTagRequest>,
) -> ApiResult<Created<Json<MoodTagResponse>>> {
    let tag = MoodTagService::new(state.service_context())
        .create(auth.user_id, request)
        .await?;
    Ok(Created(Json(tag)))
}

/// PATCH /mood-tags/{tag_id}
pub async fn update_mood_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(tag_id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateMoodTagRequest>,
) -> ApiResult<Json<MoodTagResponse>> {
    let tag = MoodTagService::new(state.service_context())
        .update(auth.user_id, tag_id, request)
        .await?;
    Ok(Json(tag))
}

/// DELETE /mood-tags/{tag_id}
pub async fn delete_mood_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(tag_id): IdPath,
) -> ApiResult<NoContent> {
    MoodTagService::new(state.service_context())
        .delete(auth.user_id, tag_id)
        .await?;
    Ok(NoContent)
}
