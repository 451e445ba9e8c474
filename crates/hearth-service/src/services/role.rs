//! Role service
//!
//! Role checks used by admin endpoints and role assignment.

use hearth_core::entities::{can_moderate, has_admin, UserRole};
use hearth_core::{DomainEvent, RoleName, Snowflake};
use tracing::{info, instrument};

use crate::dto::{AssignRoleRequest, RoleResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct RoleService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoleService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn require_admin(&self, user_id: Snowflake) -> ServiceResult<()> {
        let roles = self.ctx.role_repo().find_by_user(user_id).await?;
        if has_admin(&roles) {
            Ok(())
        } else {
            Err(ServiceError::missing_role(RoleName::ADMIN))
        }
    }

    /// Admins pass as moderators.
    #[instrument(skip(self))]
    pub async fn require_moderator(&self, user_id: Snowflake) -> ServiceResult<()> {
        let roles = self.ctx.role_repo().find_by_user(user_id).await?;
        if can_moderate(&roles) {
            Ok(())
        } else {
            Err(ServiceError::missing_role(RoleName::MODERATOR))
        }
    }

    #[instrument(skip(self))]
    pub async fn roles_of(&self, user_id: Snowflake) -> ServiceResult<Vec<RoleResponse>> {
        let roles = self.ctx.role_repo().find_by_user(user_id).await?;
        Ok(roles.iter().map(RoleResponse::from).collect())
    }

    /// Roles of another user, admin only.
    #[instrument(skip(self))]
    pub async fn roles_for_admin(
        &self,
        actor_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<RoleResponse>> {
        self.require_admin(actor_id).await?;
        self.roles_of(user_id).await
    }

    #[instrument(skip(self, request), fields(role = %request.role))]
    pub async fn assign(
        &self,
        actor_id: Snowflake,
        user_id: Snowflake,
        request: AssignRoleRequest,
    ) -> ServiceResult<RoleResponse> {
        self.require_admin(actor_id).await?;

        let role = RoleName::parse(&request.role)?;
        if self.ctx.user_repo().find_by_id(user_id).await?.is_none() {
            return Err(ServiceError::not_found("User", user_id.to_string()));
        }

        let assignment = UserRole::new(user_id, role.clone(), Some(actor_id));
        if !self.ctx.role_repo().assign(&assignment).await? {
            return Err(ServiceError::Domain(hearth_core::DomainError::AlreadyHasRole));
        }

        info!(user_id = %user_id, role = %role.as_str(), granted_by = %actor_id, "Role assigned");

        self.ctx
            .publisher()
            .publish_event(&DomainEvent::RoleAssigned { user_id, role })
            .await
            .ok();

        Ok(RoleResponse::from(&assignment))
    }
}
