//! User handlers
//!
//! Own account, own stories and roles, public profiles.

use axum::{extract::State, Json};
use hearth_core::PublicProfile;
use hearth_service::dto::{
    AssignRoleRequest, FeedQuery, PageResponse, RoleResponse, StoryResponse, UpdateMeRequest,
    UserResponse,
};
use hearth_service::{RoleService, StoryService, UserService};

use crate::extractors::{ApiJson, ApiQuery, AuthUser, IdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// GET /users/@me
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::new(state.service_context()).me(auth.user_id).await?;
    Ok(Json(user))
}

/// PATCH /users/@me
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateMeRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::new(state.service_context())
        .update_me(auth.user_id, request)
        .await?;
    Ok(Json(user))
}

/// GET /users/@me/stories
pub async fn my_stories(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<FeedQuery>,
) -> ApiResult<Json<PageResponse<StoryResponse>>> {
    let page = StoryService::new(state.service_context())
        .mine(auth.user_id, query)
        .await?;
    Ok(Json(page))
}

/// GET /users/@me/roles
pub async fn my_roles(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = RoleService::new(state.service_context())
        .roles_of(auth.user_id)
        .await?;
    Ok(Json(roles))
}

/// GET /users/{user_id}/roles
pub async fn user_roles(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = RoleService::new(state.service_context())
        .roles_for_admin(auth.user_id, user_id)
        .await?;
    Ok(Json(roles))
}

/// POST /users/{user_id}/roles
pub async fn assign_role(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath,
    ApiJson(request): ApiJson<AssignRoleRequest>,
) -> ApiResult<Created<Json<RoleResponse>>> {
    let role = RoleService::new(state.service_context())
        .assign(auth.user_id, user_id, request)
        .await?;
    Ok(Created(Json(role)))
}

/// GET /profiles/{user_id}
pub async fn get_profile(
    State(state): State<AppState>,
    IdPath(user_id): IdPath,
) -> ApiResult<Json<PublicProfile>> {
    let profile = UserService::new(state.service_context()).profile(user_id).await?;
    Ok(Json(profile))
}
