//! Request DTOs for API endpoints
//!
//! Bodies implement `Deserialize` and, where they carry user input,
//! `Validate`. Domain rules (tag vocabulary, colors, role names) are checked
//! again by the entities.

use serde::Deserialize;
use validator::Validate;

use hearth_core::Snowflake;

// ============================================================================
// Auth Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 50, message = "Display name must be 1-50 characters"))]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignOutRequest {
    pub refresh_token: String,
}

// ============================================================================
// User Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct UpdateMeRequest {
    #[validate(length(min = 1, max = 50, message = "Display name must be 1-50 characters"))]
    pub display_name: Option<String>,

    /// Empty string clears the avatar
    #[validate(length(max = 2048, message = "Avatar URL is too long"))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignRoleRequest {
    pub role: String,
}

// ============================================================================
// Story Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStoryRequest {
    #[validate(length(max = 120, message = "Title must be at most 120 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: String,

    #[serde(default)]
    #[validate(length(max = 5, message = "At most 5 emotion tags"))]
    pub emotion_tags: Vec<String>,

    #[serde(default)]
    pub is_anonymous: bool,

    #[serde(default = "default_true")]
    pub is_public: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct UpdateStoryRequest {
    #[validate(length(max = 120, message = "Title must be at most 120 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: Option<String>,

    #[validate(length(max = 5, message = "At most 5 emotion tags"))]
    pub emotion_tags: Option<Vec<String>>,

    pub is_anonymous: Option<bool>,

    pub is_public: Option<bool>,
}

/// `?before=&limit=` cursor query
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct FeedQuery {
    pub before: Option<Snowflake>,
    pub limit: Option<i64>,
}

// ============================================================================
// Mood Tag Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMoodTagRequest {
    #[validate(length(min = 1, max = 32, message = "Name must be 1-32 characters"))]
    pub name: String,

    #[validate(length(max = 280, message = "Description must be at most 280 characters"))]
    pub description: Option<String>,

    pub color: String,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct UpdateMoodTagRequest {
    #[validate(length(min = 1, max = 32, message = "Name must be 1-32 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 280, message = "Description must be at most 280 characters"))]
    pub description: Option<String>,

    pub color: Option<String>,
}

// ============================================================================
// RPC Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MatchStoriesByMoodsRequest {
    #[serde(default)]
    pub moods: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordEventRequest {
    #[validate(length(min = 1, max = 64, message = "Event type must be 1-64 characters"))]
    pub event_type: String,

    pub story_id: Option<Snowflake>,

    #[serde(default)]
    pub metadata: serde_json::Value,
}

// ============================================================================
// Admin Requests
// ============================================================================

#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct AnalyticsQuery {
    /// Window for event and top-story figures
    pub days: Option<i64>,
    pub top: Option<i64>,
}

// ============================================================================
// Chat Requests
// ============================================================================

/// Fields default to empty so shape problems surface as the chat
/// validation error instead of a generic body rejection.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessageInput>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChatMessageInput {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}
