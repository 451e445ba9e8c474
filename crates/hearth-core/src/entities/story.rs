//! Story entity - a whisper written by a member of the community

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

pub const MAX_STORY_CONTENT: usize = 5000;
pub const MAX_STORY_TITLE: usize = 120;
pub const MAX_EMOTION_TAGS: usize = 5;

/// A user-authored story.
///
/// The author is always recorded so that edits can be authorized, but
/// anonymous stories never expose it through [`Story::public_author`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub id: Snowflake,
    pub author_id: Snowflake,
    pub title: Option<String>,
    pub content: String,
    pub emotion_tags: Vec<String>,
    pub is_anonymous: bool,
    pub is_public: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Story {
    pub fn new(
        id: Snowflake,
        author_id: Snowflake,
        content: String,
        emotion_tags: Vec<String>,
    ) -> Result<Self, DomainError> {
        let now = Utc::now();
        let mut story = Self {
            id,
            author_id,
            title: None,
            content: String::new(),
            emotion_tags: Vec::new(),
            is_anonymous: false,
            is_public: true,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        story.content = validate_content(content)?;
        story.emotion_tags = normalize_tags(emotion_tags)?;
        Ok(story)
    }

    #[inline]
    pub fn is_authored_by(&self, user_id: Snowflake) -> bool {
        self.author_id == user_id
    }

    /// Public stories are visible to everyone, drafts only to their author.
    pub fn is_visible_to(&self, viewer: Option<Snowflake>) -> bool {
        self.is_public || viewer.is_some_and(|v| self.is_authored_by(v))
    }

    /// Author id as shown to other readers.
    pub fn public_author(&self) -> Option<Snowflake> {
        (!self.is_anonymous).then_some(self.author_id)
    }

    pub fn set_title(&mut self, title: Option<String>) -> Result<(), DomainError> {
        let title = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        if let Some(t) = &title {
            if t.chars().count() > MAX_STORY_TITLE {
                return Err(DomainError::ContentTooLong { max: MAX_STORY_TITLE });
            }
        }
        self.title = title;
        self.touch();
        Ok(())
    }

    pub fn set_content(&mut self, content: String) -> Result<(), DomainError> {
        self.content = validate_content(content)?;
        self.touch();
        Ok(())
    }

    pub fn set_emotion_tags(&mut self, tags: Vec<String>) -> Result<(), DomainError> {
        self.emotion_tags = normalize_tags(tags)?;
        self.touch();
        Ok(())
    }

    pub fn set_visibility(&mut self, is_public: bool) {
        self.is_public = is_public;
        self.touch();
    }

    pub fn set_anonymous(&mut self, is_anonymous: bool) {
        self.is_anonymous = is_anonymous;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn validate_content(content: String) -> Result<String, DomainError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(DomainError::ValidationError(
            "story content must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_STORY_CONTENT {
        return Err(DomainError::ContentTooLong {
            max: MAX_STORY_CONTENT,
        });
    }
    Ok(trimmed.to_string())
}

/// Lowercases, trims and de-duplicates tags while keeping first-seen order.
pub fn normalize_tags(tags: Vec<String>) -> Result<Vec<String>, DomainError> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || normalized.contains(&tag) {
            continue;
        }
        normalized.push(tag);
    }
    if normalized.len() > MAX_EMOTION_TAGS {
        return Err(DomainError::ValidationError(format!(
            "a story can carry at most {MAX_EMOTION_TAGS} emotion tags"
        )));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story() -> Story {
        Story::new(
            Snowflake::new(1),
            Snowflake::new(100),
            "  today was gentle  ".to_string(),
            vec!["Hopeful".to_string(), "hopeful ".to_string(), "calm".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn new_story_is_public_and_normalized() {
        let story = story();
        assert_eq!(story.content, "today was gentle");
        assert_eq!(story.emotion_tags, vec!["hopeful", "calm"]);
        assert!(story.is_public);
        assert_eq!(story.view_count, 0);
    }

    #[test]
    fn empty_content_is_rejected() {
        let err = Story::new(Snowflake::new(1), Snowflake::new(2), "   ".into(), vec![]);
        assert!(err.is_err());
    }

    #[test]
    fn drafts_are_only_visible_to_author() {
        let mut story = story();
        story.set_visibility(false);
        assert!(story.is_visible_to(Some(Snowflake::new(100))));
        assert!(!story.is_visible_to(Some(Snowflake::new(5))));
        assert!(!story.is_visible_to(None));
    }

    #[test]
    fn anonymous_story_hides_author() {
        let mut story = story();
        assert_eq!(story.public_author(), Some(Snowflake::new(100)));
        story.set_anonymous(true);
        assert_eq!(story.public_author(), None);
        assert!(story.is_authored_by(Snowflake::new(100)));
    }

    #[test]
    fn too_many_tags_are_rejected() {
        let tags = (0..6).map(|i| format!("tag{i}")).collect();
        assert!(normalize_tags(tags).is_err());
    }

    #[test]
    fn blank_title_clears_it() {
        let mut story = story();
        story.set_title(Some("  ".into())).unwrap();
        assert_eq!(story.title, None);
        story.set_title(Some(" A small win ".into())).unwrap();
        assert_eq!(story.title.as_deref(), Some("A small win"));
    }
}
