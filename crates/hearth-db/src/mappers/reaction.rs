//! Reaction models -> entities

use hearth_core::entities::{Reaction, StoryTotal};
use hearth_core::error::DomainError;
use hearth_core::value_objects::{ReactionKind, Snowflake};

use crate::models::{KindCountModel, ReactionModel, StoryReactionTotalModel};

impl TryFrom<ReactionModel> for Reaction {
    type Error = DomainError;

    fn try_from(model: ReactionModel) -> Result<Self, Self::Error> {
        Ok(Reaction {
            story_id: Snowflake::new(model.story_id),
            user_id: Snowflake::new(model.user_id),
            kind: parse_kind(&model.kind)?,
            created_at: model.created_at,
        })
    }
}

impl KindCountModel {
    pub fn into_pair(self) -> Result<(ReactionKind, i64), DomainError> {
        Ok((parse_kind(&self.kind)?, self.count))
    }
}

impl From<StoryReactionTotalModel> for StoryTotal {
    fn from(model: StoryReactionTotalModel) -> Self {
        StoryTotal {
            story_id: Snowflake::new(model.story_id),
            reactions: model.reactions,
        }
    }
}

fn parse_kind(raw: &str) -> Result<ReactionKind, DomainError> {
    raw.parse()
        .map_err(|_| DomainError::DatabaseError(format!("unexpected reaction kind in row: {raw}")))
}
