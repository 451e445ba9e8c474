//! Request and response shapes for end-to-end tests

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique across runs against the same database.
pub fn unique_suffix() -> u64 {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
    nanos.wrapping_add(COUNTER.fetch_add(1, Ordering::SeqCst))
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl SignUpRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            email: format!("reader{suffix}@example.com"),
            password: "HearthPass123!".to_string(),
            display_name: format!("reader {suffix}"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl SignInRequest {
    pub fn from_sign_up(request: &SignUpRequest) -> Self {
        Self {
            email: request.email.clone(),
            password: request.password.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateStoryRequest {
    pub title: Option<String>,
    pub content: String,
    pub emotion_tags: Vec<String>,
    pub is_anonymous: bool,
    pub is_public: bool,
}

impl CreateStoryRequest {
    pub fn public(content: &str) -> Self {
        Self {
            title: None,
            content: content.to_string(),
            emotion_tags: Vec::new(),
            is_anonymous: false,
            is_public: true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoryResponse {
    pub id: String,
    pub author_id: Option<String>,
    pub content: String,
    pub emotion_tags: Vec<String>,
    pub is_anonymous: bool,
    pub is_public: bool,
    pub view_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReactionResponse {
    pub story_id: String,
    pub user_id: String,
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
