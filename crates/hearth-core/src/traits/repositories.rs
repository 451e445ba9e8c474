//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    AnalyticsEvent, AnalyticsSummary, MoodTag, Reaction, Story, StoryTotal, User, UserRole,
};
use crate::error::DomainError;
use crate::value_objects::{ReactionKind, RoleName, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    async fn update(&self, user: &User) -> RepoResult<()>;

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;
}

// ============================================================================
// Story Repository
// ============================================================================

/// Cursor pagination, newest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoryQuery {
    pub before: Option<Snowflake>,
    pub limit: i64,
}

#[async_trait]
pub trait StoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Story>>;

    /// Public stories ordered by creation time, newest first.
    async fn list_public(&self, query: StoryQuery) -> RepoResult<Vec<Story>>;

    /// All stories of one author, drafts included.
    async fn list_by_author(&self, author_id: Snowflake, query: StoryQuery)
        -> RepoResult<Vec<Story>>;

    async fn create(&self, story: &Story) -> RepoResult<()>;

    async fn update(&self, story: &Story) -> RepoResult<()>;

    /// Returns the new count, or `None` when the story does not exist.
    async fn increment_views(&self, id: Snowflake) -> RepoResult<Option<i64>>;

    /// Ids of public stories tagged with any of `moods`, newest first.
    async fn match_by_moods(&self, moods: &[String], limit: i64) -> RepoResult<Vec<Snowflake>>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    async fn find_by_story(&self, story_id: Snowflake) -> RepoResult<Vec<Reaction>>;

    async fn find_by_story_and_user(
        &self,
        story_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Vec<Reaction>>;

    /// `false` when the row already existed.
    async fn create(&self, reaction: &Reaction) -> RepoResult<bool>;

    /// `false` when there was nothing to delete.
    async fn delete(
        &self,
        story_id: Snowflake,
        user_id: Snowflake,
        kind: ReactionKind,
    ) -> RepoResult<bool>;

    async fn count_by_kind(&self, story_id: Snowflake) -> RepoResult<Vec<(ReactionKind, i64)>>;

    async fn totals_for_stories(&self, story_ids: &[Snowflake]) -> RepoResult<Vec<StoryTotal>>;
}

// ============================================================================
// Mood Tag Repository
// ============================================================================

#[async_trait]
pub trait MoodTagRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<MoodTag>>;

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<MoodTag>>;

    async fn list(&self) -> RepoResult<Vec<MoodTag>>;

    /// Subset of `names` that exist as mood tags.
    async fn existing_names(&self, names: &[String]) -> RepoResult<Vec<String>>;

    async fn create(&self, tag: &MoodTag) -> RepoResult<()>;

    async fn update(&self, tag: &MoodTag) -> RepoResult<()>;

    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Role Repository
// ============================================================================

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<UserRole>>;

    async fn has_role(&self, user_id: Snowflake, role: &RoleName) -> RepoResult<bool>;

    /// `false` when the user already held the role.
    async fn assign(&self, assignment: &UserRole) -> RepoResult<bool>;
}

// ============================================================================
// Analytics Repository
// ============================================================================

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn record(&self, event: &AnalyticsEvent) -> RepoResult<()>;

    /// Dashboard aggregates; event and top-story figures cover `since..now`.
    async fn summary(&self, since: DateTime<Utc>, top_limit: i64) -> RepoResult<AnalyticsSummary>;
}
