//! Authentication service
//!
//! Email/password sign-up and sign-in, refresh-token rotation, sign-out.
//! Admin sign-in is the ordinary credential check plus an `admin` role check.

use hearth_common::auth::{hash_password, validate_password_strength, verify_password};
use hearth_common::AppError;
use hearth_core::entities::{normalize_email, User};
use tracing::{info, instrument, warn};

use crate::dto::{AuthResponse, RefreshTokenRequest, SignInRequest, SignUpRequest, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::role::RoleService;

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: SignUpRequest) -> ServiceResult<AuthResponse> {
        validate_password_strength(&request.password)?;

        let email = normalize_email(&request.email)?;
        if self.ctx.user_repo().email_exists(&email).await? {
            return Err(ServiceError::conflict("Email already registered"));
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::new(self.ctx.generate_id(), &email, &request.display_name)?;
        self.ctx.user_repo().create(&user, &password_hash).await?;

        info!(user_id = %user.id, "User signed up");

        self.issue_session(&user).await
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_in(&self, request: SignInRequest) -> ServiceResult<AuthResponse> {
        let user = self.check_credentials(&request).await?;
        info!(user_id = %user.id, "User signed in");
        self.issue_session(&user).await
    }

    /// Same credential path as `sign_in`, then requires the `admin` role.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn admin_sign_in(&self, request: SignInRequest) -> ServiceResult<AuthResponse> {
        let user = self.check_credentials(&request).await?;
        RoleService::new(self.ctx).require_admin(user.id).await?;
        info!(user_id = %user.id, "Administrator signed in");
        self.issue_session(&user).await
    }

    /// Consume a refresh token and return a fresh session.
    #[instrument(skip(self, request))]
    pub async fn refresh(&self, request: RefreshTokenRequest) -> ServiceResult<AuthResponse> {
        let (user_id, refresh_token) = self
            .ctx
            .refresh_token_store()
            .rotate(&request.refresh_token)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidToken))?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        let access = self.ctx.jwt_service().issue_access_token(user.id)?;
        info!(user_id = %user.id, "Session refreshed");

        Ok(AuthResponse::new(
            access.token,
            refresh_token,
            access.expires_in,
            UserResponse::from(&user),
        ))
    }

    /// Revoking an unknown token is not an error.
    #[instrument(skip(self, refresh_token))]
    pub async fn sign_out(&self, refresh_token: &str) -> ServiceResult<()> {
        let revoked = self.ctx.refresh_token_store().revoke(refresh_token).await?;
        info!(revoked, "Signed out");
        Ok(())
    }

    async fn check_credentials(&self, request: &SignInRequest) -> ServiceResult<User> {
        let email = normalize_email(&request.email)
            .map_err(|_| ServiceError::App(AppError::InvalidCredentials))?;

        let user = self
            .ctx
            .user_repo()
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!("Sign-in failed: unknown email");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidCredentials))?;

        if !verify_password(&request.password, &password_hash)? {
            warn!(user_id = %user.id, "Sign-in failed: wrong password");
            return Err(ServiceError::App(AppError::InvalidCredentials));
        }

        Ok(user)
    }

    async fn issue_session(&self, user: &User) -> ServiceResult<AuthResponse> {
        let access = self.ctx.jwt_service().issue_access_token(user.id)?;
        let refresh_token = self.ctx.refresh_token_store().issue(user.id).await?;

        Ok(AuthResponse::new(
            access.token,
            refresh_token,
            access.expires_in,
            UserResponse::from(user),
        ))
    }
}
