//! Authentication handlers
//!
//! Sign-up, sign-in (plain and admin), refresh token rotation and sign-out.

use axum::{extract::State, Json};
use hearth_service::dto::{
    AuthResponse, RefreshTokenRequest, SignInRequest, SignOutRequest, SignUpRequest,
};
use hearth_service::AuthService;

use crate::extractors::{ApiJson, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// POST /auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignUpRequest>,
) -> ApiResult<Created<Json<AuthResponse>>> {
    let response = AuthService::new(state.service_context()).sign_up(request).await?;
    Ok(Created(Json(response)))
}

/// POST /auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignInRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = AuthService::new(state.service_context()).sign_in(request).await?;
    Ok(Json(response))
}

/// POST /auth/admin/sign-in
pub async fn admin_sign_in(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignInRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = AuthService::new(state.service_context())
        .admin_sign_in(request)
        .await?;
    Ok(Json(response))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshTokenRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = AuthService::new(state.service_context()).refresh(request).await?;
    Ok(Json(response))
}

/// POST /auth/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignOutRequest>,
) -> ApiResult<NoContent> {
    AuthService::new(state.service_context())
        .sign_out(&request.refresh_token)
        .await?;
    Ok(NoContent)
}
