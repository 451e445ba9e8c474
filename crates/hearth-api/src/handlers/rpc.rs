//! RPC-style endpoints under `/rpc`.

use axum::{extract::State, Json};
use hearth_service::dto::{MatchStoriesByMoodsRequest, MatchStoriesResponse, RecordEventRequest};
use hearth_service::{AnalyticsService, StoryService};

use crate::extractors::{ApiJson, OptionalAuthUser, ValidatedJson};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// POST /rpc/match_stories_by_moods
pub async fn match_stories_by_moods(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<MatchStoriesByMoodsRequest>,
) -> ApiResult<Json<MatchStoriesResponse>> {
    let matched = StoryService::new(state.service_context())
        .match_by_moods(request)
        .await?;
    Ok(Json(matched))
}

/// POST /rpc/record_event
pub async fn record_event(
    State(state): State<AppState>,
    caller: OptionalAuthUser,
    ValidatedJson(request): ValidatedJson<RecordEventRequest>,
) -> ApiResult<NoContent> {
    AnalyticsService::new(state.service_context())
        .record(caller.user_id(), request)
        .await?;
    Ok(NoContent)
}
