//! User service
//!
//! Own account and public profiles.

use hearth_core::entities::PublicProfile;
use hearth_core::Snowflake;
use tracing::{info, instrument};

use crate::dto::{UpdateMeRequest, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn me(&self, user_id: Snowflake) -> ServiceResult<UserResponse> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;
        Ok(UserResponse::from(&user))
    }

    #[instrument(skip(self, request))]
    pub async fn update_me(
        &self,
        user_id: Snowflake,
        request: UpdateMeRequest,
    ) -> ServiceResult<UserResponse> {
        let mut user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        if let Some(display_name) = request.display_name {
            user.set_display_name(&display_name)?;
        }
        if let Some(avatar_url) = request.avatar_url {
            let avatar_url = avatar_url.trim();
            user.set_avatar_url((!avatar_url.is_empty()).then(|| avatar_url.to_string()));
        }

        self.ctx.user_repo().update(&user).await?;
        info!(user_id = %user_id, "Account updated");

        Ok(UserResponse::from(&user))
    }

    /// Public projection only: id, display name, avatar.
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: Snowflake) -> ServiceResult<PublicProfile> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .map(|u| u.profile())
            .ok_or_else(|| ServiceError::not_found("Profile", user_id.to_string()))
    }
}
