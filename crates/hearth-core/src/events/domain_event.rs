//! Domain events - emitted by services after a successful write
//!
//! Each event maps to the change notice that the push channel fans out.

use serde::{Deserialize, Serialize};

use super::change::{ChangeNotice, ChangeOp, WatchedTable};
use crate::value_objects::{ReactionKind, RoleName, Snowflake};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    StoryCreated { story_id: Snowflake },
    StoryUpdated { story_id: Snowflake },
    StoryViewed { story_id: Snowflake },
    ReactionAdded {
        story_id: Snowflake,
        user_id: Snowflake,
        kind: ReactionKind,
    },
    ReactionRemoved {
        story_id: Snowflake,
        user_id: Snowflake,
        kind: ReactionKind,
    },
    MoodTagCreated { tag_id: Snowflake },
    MoodTagUpdated { tag_id: Snowflake },
    MoodTagDeleted { tag_id: Snowflake },
    RoleAssigned { user_id: Snowflake, role: RoleName },
}

impl DomainEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::StoryCreated { .. } => "STORY_CREATED",
            Self::StoryUpdated { .. } => "STORY_UPDATED",
            Self::StoryViewed { .. } => "STORY_VIEWED",
            Self::ReactionAdded { .. } => "REACTION_ADDED",
            Self::ReactionRemoved { .. } => "REACTION_REMOVED",
            Self::MoodTagCreated { .. } => "MOOD_TAG_CREATED",
            Self::MoodTagUpdated { .. } => "MOOD_TAG_UPDATED",
            Self::MoodTagDeleted { .. } => "MOOD_TAG_DELETED",
            Self::RoleAssigned { .. } => "ROLE_ASSIGNED",
        }
    }

    /// Notice carrying only the row key. Anonymous authorship never leaks
    /// because story notices are keyed by story id alone.
    pub fn to_notice(&self) -> ChangeNotice {
        match self {
            Self::StoryCreated { story_id } => {
                ChangeNotice::new(WatchedTable::Stories, ChangeOp::Insert).with_key("id", story_id)
            }
            Self::StoryUpdated { story_id } | Self::StoryViewed { story_id } => {
                ChangeNotice::new(WatchedTable::Stories, ChangeOp::Update).with_key("id", story_id)
            }
            Self::ReactionAdded {
                story_id, user_id, ..
            } => ChangeNotice::new(WatchedTable::Reactions, ChangeOp::Insert)
                .with_key("story_id", story_id)
                .with_key("user_id", user_id),
            Self::ReactionRemoved {
                story_id, user_id, ..
            } => ChangeNotice::new(WatchedTable::Reactions, ChangeOp::Delete)
                .with_key("story_id", story_id)
                .with_key("user_id", user_id),
            Self::MoodTagCreated { tag_id } => {
                ChangeNotice::new(WatchedTable::MoodTags, ChangeOp::Insert).with_key("id", tag_id)
            }
            Self::MoodTagUpdated { tag_id } => {
                ChangeNotice::new(WatchedTable::MoodTags, ChangeOp::Update).with_key("id", tag_id)
            }
            Self::MoodTagDeleted { tag_id } => {
                ChangeNotice::new(WatchedTable::MoodTags, ChangeOp::Delete).with_key("id", tag_id)
            }
            Self::RoleAssigned { user_id, .. } => {
                ChangeNotice::new(WatchedTable::UserRoles, ChangeOp::Insert)
                    .with_key("user_id", user_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ChangeTopic;

    #[test]
    fn reaction_event_reaches_story_topic() {
        let event = DomainEvent::ReactionAdded {
            story_id: Snowflake::new(5),
            user_id: Snowflake::new(6),
            kind: ReactionKind::Heart,
        };
        let notice = event.to_notice();
        assert_eq!(notice.op, ChangeOp::Insert);
        assert!(ChangeTopic::story_reactions(Snowflake::new(5)).matches(&notice));
    }

    #[test]
    fn view_is_an_update() {
        let notice = DomainEvent::StoryViewed {
            story_id: Snowflake::new(1),
        }
        .to_notice();
        assert_eq!(notice.table, WatchedTable::Stories);
        assert_eq!(notice.op, ChangeOp::Update);
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(DomainEvent::MoodTagDeleted {
            tag_id: Snowflake::new(3),
        })
        .unwrap();
        assert_eq!(json["type"], "MOOD_TAG_DELETED");
        assert_eq!(json["tag_id"], "3");
    }
}
