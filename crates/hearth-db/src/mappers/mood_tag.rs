//! Mood tag model -> entity

use hearth_core::entities::MoodTag;
use hearth_core::value_objects::Snowflake;

use crate::models::MoodTagModel;

impl From<MoodTagModel> for MoodTag {
    fn from(model: MoodTagModel) -> Self {
        MoodTag {
            id: Snowflake::new(model.id),
            name: model.name,
            description: model.description,
            color: model.color,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
