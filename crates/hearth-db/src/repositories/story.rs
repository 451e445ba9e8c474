//! PostgreSQL implementation of StoryRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use hearth_core::entities::Story;
use hearth_core::error::DomainError;
use hearth_core::traits::{RepoResult, StoryQuery, StoryRepository};
use hearth_core::value_objects::Snowflake;

use crate::models::StoryModel;

use super::error::{map_db_error, map_fk_violation};

const STORY_COLUMNS: &str = "id, author_id, title, content, emotion_tags, is_anonymous, \
                             is_public, view_count, created_at, updated_at";

#[derive(Clone)]
pub struct PgStoryRepository {
    pool: PgPool,
}

impl PgStoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `i64::MAX` stands in for "no cursor" so one statement serves both cases.
fn cursor(query: &StoryQuery) -> i64 {
    query.before.map_or(i64::MAX, Snowflake::into_inner)
}

#[async_trait]
impl StoryRepository for PgStoryRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Story>> {
        let sql = format!("SELECT {STORY_COLUMNS} FROM stories WHERE id = $1");
        let result = sqlx::query_as::<_, StoryModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Story::from))
    }

    #[instrument(skip(self))]
    async fn list_public(&self, query: StoryQuery) -> RepoResult<Vec<Story>> {
        let sql = format!(
            "SELECT {STORY_COLUMNS} FROM stories
             WHERE is_public AND id < $1
             ORDER BY id DESC
             LIMIT $2"
        );
        let results = sqlx::query_as::<_, StoryModel>(&sql)
            .bind(cursor(&query))
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(Story::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_by_author(
        &self,
        author_id: Snowflake,
        query: StoryQuery,
    ) -> RepoResult<Vec<Story>> {
        let sql = format!(
            "SELECT {STORY_COLUMNS} FROM stories
             WHERE author_id = $1 AND id < $2
             ORDER BY id DESC
             LIMIT $3"
        );
        let results = sqlx::query_as::<_, StoryModel>(&sql)
            .bind(author_id.into_inner())
            .bind(cursor(&query))
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(Story::from).collect())
    }

    #[instrument(skip(self, story), fields(story_id = %story.id))]
    async fn create(&self, story: &Story) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO stories (id, author_id, title, content, emotion_tags, is_anonymous,
                                 is_public, view_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(story.id.into_inner())
        .bind(story.author_id.into_inner())
        .bind(&story.title)
        .bind(&story.content)
        .bind(&story.emotion_tags)
        .bind(story.is_anonymous)
        .bind(story.is_public)
        .bind(story.view_count)
        .bind(story.created_at)
        .bind(story.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_fk_violation(e, || DomainError::UserNotFound(story.author_id)))?;

        Ok(())
    }

    /// View count is left alone; it only moves through `increment_views`.
    #[instrument(skip(self, story), fields(story_id = %story.id))]
    async fn update(&self, story: &Story) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE stories
            SET title = $2, content = $3, emotion_tags = $4, is_anonymous = $5,
                is_public = $6, updated_at = $7
            WHERE id = $1
            ",
        )
        .bind(story.id.into_inner())
        .bind(&story.title)
        .bind(&story.content)
        .bind(&story.emotion_tags)
        .bind(story.is_anonymous)
        .bind(story.is_public)
        .bind(story.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::StoryNotFound(story.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn increment_views(&self, id: Snowflake) -> RepoResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>(
            r"
            UPDATE stories
            SET view_count = view_count + 1
            WHERE id = $1 AND is_public
            RETURNING view_count
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn match_by_moods(&self, moods: &[String], limit: i64) -> RepoResult<Vec<Snowflake>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id
            FROM stories
            WHERE is_public AND emotion_tags && $1
            ORDER BY id DESC
            LIMIT $2
            ",
        )
        .bind(moods)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(Snowflake::new).collect())
    }
}
