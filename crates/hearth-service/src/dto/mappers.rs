//! Entity to response DTO conversions

use hearth_core::entities::{MoodTag, Reaction, Story, User, UserRole};

use super::responses::{
    MoodTagResponse, ReactionResponse, RoleResponse, StoryResponse, UserResponse,
};

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<&Story> for StoryResponse {
    fn from(story: &Story) -> Self {
        Self {
            id: story.id,
            author_id: story.public_author(),
            title: story.title.clone(),
            content: story.content.clone(),
            emotion_tags: story.emotion_tags.clone(),
            is_anonymous: story.is_anonymous,
            is_public: story.is_public,
            view_count: story.view_count,
            created_at: story.created_at,
            updated_at: story.updated_at,
        }
    }
}

impl From<&Reaction> for ReactionResponse {
    fn from(reaction: &Reaction) -> Self {
        Self {
            story_id: reaction.story_id,
            user_id: reaction.user_id,
            kind: reaction.kind,
            created_at: reaction.created_at,
        }
    }
}

impl From<&MoodTag> for MoodTagResponse {
    fn from(tag: &MoodTag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
            description: tag.description.clone(),
            color: tag.color.clone(),
            created_at: tag.created_at,
            updated_at: tag.updated_at,
        }
    }
}

impl From<&UserRole> for RoleResponse {
    fn from(role: &UserRole) -> Self {
        Self {
            user_id: role.user_id,
            role: role.role.as_str().to_string(),
            granted_by: role.granted_by,
            created_at: role.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::Snowflake;

    #[test]
    fn anonymous_story_hides_author() {
        let mut story = Story::new(
            Snowflake::new(1),
            Snowflake::new(2),
            "words".to_string(),
            vec![],
        )
        .unwrap();
        story.set_anonymous(true);
        let json = serde_json::to_value(StoryResponse::from(&story)).unwrap();
        assert!(json["author_id"].is_null());
        assert_eq!(json["id"], "1");
    }

    #[test]
    fn user_response_omits_missing_avatar() {
        let user = User::new(Snowflake::new(5), "a@b.test", "Ana").unwrap();
        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert_eq!(json["email"], "a@b.test");
        assert!(json.get("avatar_url").is_none());
    }
}
