//! Admin and moderator endpoints

use axum::{extract::State, Json};
use hearth_core::AnalyticsSummary;
use hearth_service::dto::{AnalyticsQuery, FeedQuery, ModerationEntryResponse};
use hearth_service::AnalyticsService;

use crate::extractors::{ApiQuery, AuthUser};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /admin/analytics?days=&top=
pub async fn analytics(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<AnalyticsQuery>,
) -> ApiResult<Json<AnalyticsSummary>> {
    let summary = AnalyticsService::new(state.service_context())
        .dashboard(auth.user_id, query)
        .await?;
    Ok(Json(summary))
}

/// GET /admin/moderation/stories?before=&limit=
pub async fn moderation_queue(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<FeedQuery>,
) -> ApiResult<Json<Vec<ModerationEntryResponse>>> {
    let queue = AnalyticsService::new(state.service_context())
        .moderation_queue(auth.user_id, query)
        .await?;
    Ok(Json(queue))
}
