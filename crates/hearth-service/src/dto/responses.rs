//! Response DTOs for API endpoints
//!
//! Snowflake IDs serialize as strings.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hearth_core::entities::{ReactionCount, StoryTotal};
use hearth_core::{ReactionKind, Snowflake};

// ============================================================================
// Common Response Types
// ============================================================================

/// Cursor page, newest first. `next_before` feeds the next request.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_before: Option<Snowflake>,
}

// ============================================================================
// Auth / User Responses
// ============================================================================

/// The signed-in account, including private fields
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Snowflake,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Session principal returned by sign-in, sign-up and refresh
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserResponse,
}

impl AuthResponse {
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        user: UserResponse,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in,
            user,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleResponse {
    pub user_id: Snowflake,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granted_by: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Story Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StoryResponse {
    pub id: Snowflake,
    /// Null for anonymous stories
    pub author_id: Option<Snowflake>,
    pub title: Option<String>,
    pub content: String,
    pub emotion_tags: Vec<String>,
    pub is_anonymous: bool,
    pub is_public: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ViewCountResponse {
    pub view_count: i64,
}

// ============================================================================
// Reaction Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReactionResponse {
    pub story_id: Snowflake,
    pub user_id: Snowflake,
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ReactionSummaryResponse {
    pub story_id: Snowflake,
    pub total: u64,
    pub counts: Vec<ReactionCount>,
}

// ============================================================================
// Mood Tag Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MoodTagResponse {
    pub id: Snowflake,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// RPC Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MatchStoriesResponse {
    pub story_ids: Vec<Snowflake>,
}

// ============================================================================
// Admin Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ModerationEntryResponse {
    pub story: StoryResponse,
    pub reactions: i64,
}

impl ModerationEntryResponse {
    pub fn new(story: StoryResponse, totals: &[StoryTotal]) -> Self {
        let reactions = totals
            .iter()
            .find(|t| t.story_id == story.id)
            .map_or(0, |t| t.reactions);
        Self { story, reactions }
    }
}

// ============================================================================
// Chat Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

// ============================================================================
// Health Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: bool,
    pub redis: bool,
}
