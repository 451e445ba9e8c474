//! PostgreSQL implementation of RoleRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use hearth_core::entities::UserRole;
use hearth_core::error::DomainError;
use hearth_core::traits::{RepoResult, RoleRepository};
use hearth_core::value_objects::{RoleName, Snowflake};

use crate::models::UserRoleModel;

use super::error::{map_db_error, map_fk_violation};

#[derive(Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<UserRole>> {
        let results = sqlx::query_as::<_, UserRoleModel>(
            r"
            SELECT user_id, role, granted_by, created_at
            FROM user_roles
            WHERE user_id = $1
            ORDER BY role
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(UserRole::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn has_role(&self, user_id: Snowflake, role: &RoleName) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM user_roles WHERE user_id = $1 AND role = $2)",
        )
        .bind(user_id.into_inner())
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, assignment), fields(user_id = %assignment.user_id, role = %assignment.role.as_str()))]
    async fn assign(&self, assignment: &UserRole) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO user_roles (user_id, role, granted_by, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, role) DO NOTHING
            ",
        )
        .bind(assignment.user_id.into_inner())
        .bind(assignment.role.as_str())
        .bind(assignment.granted_by.map(Snowflake::into_inner))
        .bind(assignment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_fk_violation(e, || DomainError::UserNotFound(assignment.user_id)))?;

        Ok(result.rows_affected() > 0)
    }
}
