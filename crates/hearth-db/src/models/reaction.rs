//! Reaction database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the `reactions` table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub story_id: i64,
    pub user_id: i64,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

/// `GROUP BY kind` result
#[derive(Debug, Clone, FromRow)]
pub struct KindCountModel {
    pub kind: String,
    pub count: i64,
}

/// `GROUP BY story_id` result
#[derive(Debug, Clone, FromRow)]
pub struct StoryReactionTotalModel {
    pub story_id: i64,
    pub reactions: i64,
}
