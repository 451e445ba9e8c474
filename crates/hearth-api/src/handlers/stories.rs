//! Story handlers

use axum::{extract::State, Json};
use hearth_service::dto::{
    CreateStoryRequest, FeedQuery, PageResponse, StoryResponse, UpdateStoryRequest,
    ViewCountResponse,
};
use hearth_service::StoryService;

use crate::extractors::{ApiQuery, AuthUser, IdPath, OptionalAuthUser, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// GET /stories
pub async fn feed(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FeedQuery>,
) -> ApiResult<Json<PageResponse<StoryResponse>>> {
    let page = StoryService::new(state.service_context()).feed(query).await?;
    Ok(Json(page))
}

/// POST /stories
pub async fn create_story(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateStoryRequest>,
) -> ApiResult<Created<Json<StoryResponse>>> {
    let story = StoryService::new(state.service_context())
        .create(auth.user_id, request)
        .await?;
    Ok(Created(Json(story)))
}

/// GET /stories/{story_id}
pub async fn get_story(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    IdPath(story_id): IdPath,
) -> ApiResult<Json<StoryResponse>> {
    let story = StoryService::new(state.service_context())
        .get(story_id, viewer.user_id())
        .await?;
    Ok(Json(story))
}

/// PATCH /stories/{story_id}
pub async fn update_story(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(story_id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateStoryRequest>,
) -> ApiResult<Json<StoryResponse>> {
    let story = StoryService::new(state.service_context())
        .update(auth.user_id, story_id, request)
        .await?;
    Ok(Json(story))
}

/// POST /stories/{story_id}/views
pub async fn record_view(
    State(state): State<AppState>,
    IdPath(story_id): IdPath,
) -> ApiResult<Json<ViewCountResponse>> {
    let views = StoryService::new(state.service_context())
        .record_view(story_id)
        .await?;
    Ok(Json(views))
}
