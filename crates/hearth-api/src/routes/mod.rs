//! Route definitions
//!
//! Everything except health checks is mounted under `/api/v1`.

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::handlers::{admin, auth, chat, health, mood_tags, reactions, rpc, stories, users};
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health routes, kept outside the rate limiter.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(story_routes())
        .merge(mood_tag_routes())
        .merge(rpc_routes())
        .merge(admin_routes())
        .route("/chat", post(chat::chat))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/admin/sign-in", post(auth::admin_sign_in))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/sign-out", post(auth::sign_out))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/@me", get(users::get_me).patch(users::update_me))
        .route("/users/@me/stories", get(users::my_stories))
        .route("/users/@me/roles", get(users::my_roles))
        .route(
            "/users/:user_id/roles",
            get(users::user_roles).post(users::assign_role),
        )
        .route("/profiles/:user_id", get(users::get_profile))
}

fn story_routes() -> Router<AppState> {
    Router::new()
        .route("/stories", get(stories::feed).post(stories::create_story))
        .route(
            "/stories/:story_id",
            get(stories::get_story).patch(stories::update_story),
        )
        .route("/stories/:story_id/views", post(stories::record_view))
        .route("/stories/:story_id/reactions", get(reactions::list_reactions))
        .route("/stories/:story_id/reactions/@me", get(reactions::my_reactions))
        .route(
            "/stories/:story_id/reactions/summary",
            get(reactions::reaction_summary),
        )
        .route(
            "/stories/:story_id/reactions/:kind/@me",
            put(reactions::add_reaction).delete(reactions::remove_reaction),
        )
}

fn mood_tag_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/mood-tags",
            get(mood_tags::list_mood_tags).post(mood_tags::create_mood_tag),
        )
        .route(
            "/mood-tags/:tag_id",
            patch(mood_tags::update_mood_tag).delete(mood_tags::delete_mood_tag),
        )
}

fn rpc_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rpc/match_stories_by_moods",
            post(rpc::match_stories_by_moods),
        )
        .route("/rpc/record_event", post(rpc::record_event))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/analytics", get(admin::analytics))
        .route("/admin/moderation/stories", get(admin::moderation_queue))
}
