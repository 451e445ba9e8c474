//! PostgreSQL implementations of the repository traits in hearth-core

mod analytics;
mod error;
mod mood_tag;
mod reaction;
mod role;
mod story;
mod user;

pub use analytics::PgAnalyticsRepository;
pub use mood_tag::PgMoodTagRepository;
pub use reaction::PgReactionRepository;
pub use role::PgRoleRepository;
pub use story::PgStoryRepository;
pub use user::PgUserRepository;
