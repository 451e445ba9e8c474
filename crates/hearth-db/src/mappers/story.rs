//! Story model -> entity

use hearth_core::entities::Story;
use hearth_core::value_objects::Snowflake;

use crate::models::StoryModel;

impl From<StoryModel> for Story {
    fn from(model: StoryModel) -> Self {
        Story {
            id: Snowflake::new(model.id),
            author_id: Snowflake::new(model.author_id),
            title: model.title,
            content: model.content,
            emotion_tags: model.emotion_tags,
            is_anonymous: model.is_anonymous,
            is_public: model.is_public,
            view_count: model.view_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
