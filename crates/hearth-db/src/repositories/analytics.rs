//! PostgreSQL implementation of AnalyticsRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use hearth_core::entities::{
    AnalyticsEvent, AnalyticsSummary, EventTypeTotal, KindTotal, StoryTotal,
};
use hearth_core::traits::{AnalyticsRepository, RepoResult};

use crate::models::{EventTypeCountModel, KindCountModel, StoryCountsModel, StoryReactionTotalModel};

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgAnalyticsRepository {
    pool: PgPool,
}

impl PgAnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for PgAnalyticsRepository {
    #[instrument(skip(self, event), fields(event_type = %event.event_type))]
    async fn record(&self, event: &AnalyticsEvent) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO analytics_events (id, event_type, user_id, story_id, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(event.id.into_inner())
        .bind(&event.event_type)
        .bind(event.user_id.map(|id| id.into_inner()))
        .bind(event.story_id.map(|id| id.into_inner()))
        .bind(&event.metadata)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn summary(&self, since: DateTime<Utc>, top_limit: i64) -> RepoResult<AnalyticsSummary> {
        let stories = sqlx::query_as::<_, StoryCountsModel>(
            r"
            SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE is_public) AS public
            FROM stories
            ",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let by_kind = sqlx::query_as::<_, KindCountModel>(
            r"
            SELECT kind, COUNT(*) AS count
            FROM reactions
            GROUP BY kind
            ORDER BY count DESC, kind
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let by_type = sqlx::query_as::<_, EventTypeCountModel>(
            r"
            SELECT event_type, COUNT(*) AS count
            FROM analytics_events
            WHERE created_at >= $1
            GROUP BY event_type
            ORDER BY count DESC, event_type
            ",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let top = sqlx::query_as::<_, StoryReactionTotalModel>(
            r"
            SELECT story_id, COUNT(*) AS reactions
            FROM reactions
            WHERE created_at >= $1
            GROUP BY story_id
            ORDER BY reactions DESC, story_id DESC
            LIMIT $2
            ",
        )
        .bind(since)
        .bind(top_limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let reactions_by_kind = by_kind
            .into_iter()
            .map(|row| row.into_pair().map(|(kind, count)| KindTotal { kind, count }))
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(AnalyticsSummary {
            since,
            total_stories: stories.total,
            public_stories: stories.public,
            total_reactions: reactions_by_kind.iter().map(|k| k.count).sum(),
            reactions_by_kind,
            events_by_type: by_type
                .into_iter()
                .map(|row| EventTypeTotal {
                    event_type: row.event_type,
                    count: row.count,
                })
                .collect(),
            top_stories: top.into_iter().map(StoryTotal::from).collect(),
        })
    }
}
