//! Analytics events and the dashboard summary built from them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{ReactionKind, Snowflake};

const MAX_EVENT_TYPE: usize = 64;

/// Append-only usage event.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsEvent {
    pub id: Snowflake,
    pub event_type: String,
    pub user_id: Option<Snowflake>,
    pub story_id: Option<Snowflake>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(
        id: Snowflake,
        event_type: &str,
        user_id: Option<Snowflake>,
        story_id: Option<Snowflake>,
        metadata: serde_json::Value,
    ) -> Result<Self, DomainError> {
        let event_type = event_type.trim();
        let valid = !event_type.is_empty()
            && event_type.len() <= MAX_EVENT_TYPE
            && event_type
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(DomainError::ValidationError(format!(
                "invalid analytics event type: {event_type}"
            )));
        }
        Ok(Self {
            id,
            event_type: event_type.to_string(),
            user_id,
            story_id,
            metadata,
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindTotal {
    pub kind: ReactionKind,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeTotal {
    pub event_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryTotal {
    pub story_id: Snowflake,
    pub reactions: i64,
}

/// Aggregates shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub since: DateTime<Utc>,
    pub total_stories: i64,
    pub public_stories: i64,
    pub total_reactions: i64,
    pub reactions_by_kind: Vec<KindTotal>,
    pub events_by_type: Vec<EventTypeTotal>,
    pub top_stories: Vec<StoryTotal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_must_be_snake_case() {
        let ok = AnalyticsEvent::new(
            Snowflake::new(1),
            "reaction_added",
            None,
            Some(Snowflake::new(2)),
            serde_json::json!({ "kind": "heart" }),
        );
        assert!(ok.is_ok());

        let bad = AnalyticsEvent::new(
            Snowflake::new(1),
            "Reaction Added",
            None,
            None,
            serde_json::Value::Null,
        );
        assert!(bad.is_err());
    }
}
