//! PostgreSQL implementation of ReactionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use hearth_core::entities::{Reaction, StoryTotal};
use hearth_core::error::DomainError;
use hearth_core::traits::{ReactionRepository, RepoResult};
use hearth_core::value_objects::{ReactionKind, Snowflake};

use crate::models::{KindCountModel, ReactionModel, StoryReactionTotalModel};

use super::error::{map_db_error, map_fk_violation};

#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(skip(self))]
    async fn find_by_story(&self, story_id: Snowflake) -> RepoResult<Vec<Reaction>> {
        let results = sqlx::query_as::<_, ReactionModel>(
            r"
            SELECT story_id, user_id, kind, created_at
            FROM reactions
            WHERE story_id = $1
            ORDER BY created_at
            ",
        )
        .bind(story_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Reaction::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_by_story_and_user(
        &self,
        story_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Vec<Reaction>> {
        let results = sqlx::query_as::<_, ReactionModel>(
            r"
            SELECT story_id, user_id, kind, created_at
            FROM reactions
            WHERE story_id = $1 AND user_id = $2
            ",
        )
        .bind(story_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Reaction::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn create(&self, reaction: &Reaction) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO reactions (story_id, user_id, kind, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (story_id, user_id, kind) DO NOTHING
            ",
        )
        .bind(reaction.story_id.into_inner())
        .bind(reaction.user_id.into_inner())
        .bind(reaction.kind.as_str())
        .bind(reaction.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_fk_violation(e, || DomainError::StoryNotFound(reaction.story_id)))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        story_id: Snowflake,
        user_id: Snowflake,
        kind: ReactionKind,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM reactions
            WHERE story_id = $1 AND user_id = $2 AND kind = $3
            ",
        )
        .bind(story_id.into_inner())
        .bind(user_id.into_inner())
        .bind(kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn count_by_kind(&self, story_id: Snowflake) -> RepoResult<Vec<(ReactionKind, i64)>> {
        let results = sqlx::query_as::<_, KindCountModel>(
            r"
            SELECT kind, COUNT(*) AS count
            FROM reactions
            WHERE story_id = $1
            GROUP BY kind
            ",
        )
        .bind(story_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(KindCountModel::into_pair).collect()
    }

    #[instrument(skip(self, story_ids), fields(stories = story_ids.len()))]
    async fn totals_for_stories(&self, story_ids: &[Snowflake]) -> RepoResult<Vec<StoryTotal>> {
        if story_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = story_ids.iter().map(|id| id.into_inner()).collect();

        let results = sqlx::query_as::<_, StoryReactionTotalModel>(
            r"
            SELECT story_id, COUNT(*) AS reactions
            FROM reactions
            WHERE story_id = ANY($1)
            GROUP BY story_id
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(StoryTotal::from).collect())
    }
}
