//! Analytics service
//!
//! Event recording for the `record_event` RPC, the admin dashboard and the
//! moderation queue.

use chrono::{Duration, Utc};
use hearth_core::entities::{AnalyticsEvent, AnalyticsSummary};
use hearth_core::traits::StoryQuery;
use hearth_core::Snowflake;
use tracing::{instrument, warn};

use crate::dto::{
    AnalyticsQuery, FeedQuery, ModerationEntryResponse, RecordEventRequest, StoryResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::role::RoleService;

const DEFAULT_WINDOW_DAYS: i64 = 7;
const MAX_WINDOW_DAYS: i64 = 365;
const DEFAULT_TOP_STORIES: i64 = 10;
const MAX_TOP_STORIES: i64 = 50;

pub struct AnalyticsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AnalyticsService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Malformed events are rejected; storage failures are only logged.
    #[instrument(skip(self, request), fields(event_type = %request.event_type))]
    pub async fn record(
        &self,
        user_id: Option<Snowflake>,
        request: RecordEventRequest,
    ) -> ServiceResult<()> {
        let metadata = if request.metadata.is_null() {
            serde_json::json!({})
        } else {
            request.metadata
        };
        let event = AnalyticsEvent::new(
            self.ctx.generate_id(),
            &request.event_type,
            user_id,
            request.story_id,
            metadata,
        )?;

        if let Err(e) = self.ctx.analytics_repo().record(&event).await {
            warn!(error = %e, "Dropping analytics event");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn dashboard(
        &self,
        actor_id: Snowflake,
        query: AnalyticsQuery,
    ) -> ServiceResult<AnalyticsSummary> {
        RoleService::new(self.ctx).require_moderator(actor_id).await?;

        let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, MAX_WINDOW_DAYS);
        let top = query.top.unwrap_or(DEFAULT_TOP_STORIES).clamp(1, MAX_TOP_STORIES);
        let since = Utc::now() - Duration::days(days);

        Ok(self.ctx.analytics_repo().summary(since, top).await?)
    }

    /// Most recent public stories with their reaction totals.
    #[instrument(skip(self))]
    pub async fn moderation_queue(
        &self,
        actor_id: Snowflake,
        query: FeedQuery,
    ) -> ServiceResult<Vec<ModerationEntryResponse>> {
        RoleService::new(self.ctx).require_moderator(actor_id).await?;

        let feed = self.ctx.feed_config();
        let stories = self
            .ctx
            .story_repo()
            .list_public(StoryQuery {
                before: query.before,
                limit: query.limit.unwrap_or(feed.page_size).clamp(1, feed.max_page_size.max(1)),
            })
            .await?;

        let ids: Vec<Snowflake> = stories.iter().map(|s| s.id).collect();
        let totals = self.ctx.reaction_repo().totals_for_stories(&ids).await?;

        Ok(stories
            .iter()
            .map(|s| ModerationEntryResponse::new(StoryResponse::from(s), &totals))
            .collect())
    }
}
