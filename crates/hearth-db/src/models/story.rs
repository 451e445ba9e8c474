//! Story database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct StoryModel {
    pub id: i64,
    pub author_id: i64,
    pub title: Option<String>,
    pub content: String,
    pub emotion_tags: Vec<String>,
    pub is_anonymous: bool,
    pub is_public: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
