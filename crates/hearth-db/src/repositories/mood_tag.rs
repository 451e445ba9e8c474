//! PostgreSQL implementation of MoodTagRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use hearth_core::entities::MoodTag;
use hearth_core::error::DomainError;
use hearth_core::traits::{MoodTagRepository, RepoResult};
use hearth_core::value_objects::Snowflake;

use crate::models::MoodTagModel;

use super::error::{map_db_error, map_unique_violation};

#[derive(Clone)]
pub struct PgMoodTagRepository {
    pool: PgPool,
}

impl PgMoodTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MoodTagRepository for PgMoodTagRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<MoodTag>> {
        let result = sqlx::query_as::<_, MoodTagModel>(
            r"
            SELECT id, name, description, color, created_at, updated_at
            FROM mood_tags
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(MoodTag::from))
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<MoodTag>> {
        let result = sqlx::query_as::<_, MoodTagModel>(
            r"
            SELECT id, name, description, color, created_at, updated_at
            FROM mood_tags
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(MoodTag::from))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<MoodTag>> {
        let results = sqlx::query_as::<_, MoodTagModel>(
            r"
            SELECT id, name, description, color, created_at, updated_at
            FROM mood_tags
            ORDER BY name
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(MoodTag::from).collect())
    }

    #[instrument(skip(self))]
    async fn existing_names(&self, names: &[String]) -> RepoResult<Vec<String>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, String>("SELECT name FROM mood_tags WHERE name = ANY($1)")
            .bind(names)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, tag), fields(tag = %tag.name))]
    async fn create(&self, tag: &MoodTag) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO mood_tags (id, name, description, color, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(tag.id.into_inner())
        .bind(&tag.name)
        .bind(&tag.description)
        .bind(&tag.color)
        .bind(tag.created_at)
        .bind(tag.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::MoodTagExists(tag.name.clone())))?;

        Ok(())
    }

    #[instrument(skip(self, tag), fields(tag = %tag.name))]
    async fn update(&self, tag: &MoodTag) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE mood_tags
            SET name = $2, description = $3, color = $4, updated_at = $5
            WHERE id = $1
            ",
        )
        .bind(tag.id.into_inner())
        .bind(&tag.name)
        .bind(&tag.description)
        .bind(&tag.color)
        .bind(tag.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::MoodTagExists(tag.name.clone())))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MoodTagNotFound(tag.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM mood_tags WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MoodTagNotFound(id));
        }
        Ok(())
    }
}
