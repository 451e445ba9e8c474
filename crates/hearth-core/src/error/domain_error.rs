//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Story not found: {0}")]
    StoryNotFound(Snowflake),

    #[error("Mood tag not found: {0}")]
    MoodTagNotFound(Snowflake),

    #[error("Unknown mood tags: {0}")]
    UnknownMoodTags(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Unknown reaction kind: {0}")]
    UnknownReactionKind(String),

    #[error("Invalid role name: {0}")]
    InvalidRoleName(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid subscription filter: {0}")]
    InvalidFilter(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing role: {0}")]
    MissingRole(String),

    #[error("Not story author")]
    NotStoryAuthor,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Mood tag already exists: {0}")]
    MoodTagExists(String),

    #[error("Already has this role")]
    AlreadyHasRole,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::StoryNotFound(_) => "UNKNOWN_STORY",
            Self::MoodTagNotFound(_) => "UNKNOWN_MOOD_TAG",
            Self::UnknownMoodTags(_) => "UNKNOWN_MOOD_TAGS",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::UnknownReactionKind(_) => "UNKNOWN_REACTION_KIND",
            Self::InvalidRoleName(_) => "INVALID_ROLE_NAME",
            Self::InvalidColor(_) => "INVALID_COLOR",
            Self::InvalidFilter(_) => "INVALID_FILTER",

            Self::MissingRole(_) => "MISSING_ROLE",
            Self::NotStoryAuthor => "NOT_STORY_AUTHOR",

            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::MoodTagExists(_) => "MOOD_TAG_EXISTS",
            Self::AlreadyHasRole => "ALREADY_HAS_ROLE",

            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_) | Self::StoryNotFound(_) | Self::MoodTagNotFound(_)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidEmail
                | Self::WeakPassword(_)
                | Self::ContentTooLong { .. }
                | Self::UnknownReactionKind(_)
                | Self::InvalidRoleName(_)
                | Self::InvalidColor(_)
                | Self::InvalidFilter(_)
                | Self::UnknownMoodTags(_)
        )
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::MissingRole(_) | Self::NotStoryAuthor)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists | Self::MoodTagExists(_) | Self::AlreadyHasRole
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(DomainError::StoryNotFound(Snowflake::new(1)).code(), "UNKNOWN_STORY");
        assert_eq!(
            DomainError::MissingRole("admin".into()).code(),
            "MISSING_ROLE"
        );
    }

    #[test]
    fn categories_do_not_overlap() {
        let errors = [
            DomainError::StoryNotFound(Snowflake::new(1)),
            DomainError::InvalidEmail,
            DomainError::NotStoryAuthor,
            DomainError::EmailAlreadyExists,
        ];
        for err in &errors {
            let hits = [
                err.is_not_found(),
                err.is_validation(),
                err.is_authorization(),
                err.is_conflict(),
            ]
            .iter()
            .filter(|b| **b)
            .count();
            assert_eq!(hits, 1, "{err:?}");
        }
    }
}
