//! Records as returned by the REST API

use chrono::{DateTime, Utc};
use hearth_core::{ReactionKind, Snowflake};
use serde::{Deserialize, Serialize};

pub use hearth_core::PublicProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub id: Snowflake,
    #[serde(default)]
    pub author_id: Option<Snowflake>,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub emotion_tags: Vec<String>,
    pub is_anonymous: bool,
    pub is_public: bool,
    #[serde(default)]
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

impl StoryRecord {
    /// Author whose profile may be shown; `None` for anonymous stories.
    pub fn visible_author(&self) -> Option<Snowflake> {
        if self.is_anonymous {
            None
        } else {
            self.author_id
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub story_id: Snowflake,
    pub user_id: Snowflake,
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_before: Option<Snowflake>,
}

/// Best-effort analytics emission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_id: Option<Snowflake>,
    pub metadata: serde_json::Value,
}

impl AnalyticsEvent {
    pub fn reaction_added(story_id: Snowflake, kind: ReactionKind) -> Self {
        Self {
            event_type: "reaction_added".to_string(),
            story_id: Some(story_id),
            metadata: serde_json::json!({ "reaction_type": kind.as_str() }),
        }
    }
}
