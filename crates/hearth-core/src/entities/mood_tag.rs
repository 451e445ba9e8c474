//! Mood tag entity - administrator-curated emotional label

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

const MAX_MOOD_NAME: usize = 32;
const MAX_MOOD_DESCRIPTION: usize = 280;

/// A named label used both to annotate stories and to query them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodTag {
    pub id: Snowflake,
    pub name: String,
    pub description: Option<String>,
    /// `#rrggbb`
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MoodTag {
    pub fn new(
        id: Snowflake,
        name: &str,
        description: Option<String>,
        color: &str,
    ) -> Result<Self, DomainError> {
        let now = Utc::now();
        Ok(Self {
            id,
            name: normalize_mood_name(name)?,
            description: validate_description(description)?,
            color: normalize_color(color)?,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn rename(&mut self, name: &str) -> Result<(), DomainError> {
        self.name = normalize_mood_name(name)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_description(&mut self, description: Option<String>) -> Result<(), DomainError> {
        self.description = validate_description(description)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_color(&mut self, color: &str) -> Result<(), DomainError> {
        self.color = normalize_color(color)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Mood names are compared case-insensitively and stored lowercase.
pub fn normalize_mood_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim().to_lowercase();
    if name.is_empty() || name.chars().count() > MAX_MOOD_NAME {
        return Err(DomainError::ValidationError(format!(
            "mood name must be 1-{MAX_MOOD_NAME} characters"
        )));
    }
    Ok(name)
}

fn validate_description(description: Option<String>) -> Result<Option<String>, DomainError> {
    let description = description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    match description {
        Some(d) if d.chars().count() > MAX_MOOD_DESCRIPTION => Err(DomainError::ContentTooLong {
            max: MAX_MOOD_DESCRIPTION,
        }),
        other => Ok(other),
    }
}

fn normalize_color(color: &str) -> Result<String, DomainError> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(format!("#{}", hex.to_ascii_lowercase()))
    } else {
        Err(DomainError::InvalidColor(color.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_name_and_color() {
        let tag = MoodTag::new(Snowflake::new(1), " Hopeful ", None, "FFAA00").unwrap();
        assert_eq!(tag.name, "hopeful");
        assert_eq!(tag.color, "#ffaa00");
        assert_eq!(tag.description, None);
    }

    #[test]
    fn rejects_bad_color() {
        let err = MoodTag::new(Snowflake::new(1), "calm", None, "#12345").unwrap_err();
        assert_eq!(err.code(), "INVALID_COLOR");
    }

    #[test]
    fn rejects_empty_name() {
        assert!(MoodTag::new(Snowflake::new(1), "  ", None, "#000000").is_err());
    }

    #[test]
    fn updates_touch_timestamp() {
        let mut tag = MoodTag::new(Snowflake::new(1), "calm", None, "#000000").unwrap();
        let before = tag.updated_at;
        tag.set_description(Some("slow breathing".into())).unwrap();
        assert!(tag.updated_at >= before);
        assert_eq!(tag.description.as_deref(), Some("slow breathing"));
    }
}
