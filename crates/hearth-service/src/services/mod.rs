//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] for the duration of
//! one request and owns validation, role checks and event publishing.

pub mod analytics;
pub mod auth;
pub mod chat;
pub mod context;
pub mod error;
pub mod mood_tag;
pub mod reaction;
pub mod role;
pub mod story;
pub mod user;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use chat::ChatService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use mood_tag::MoodTagService;
pub use reaction::ReactionService;
pub use role::RoleService;
pub use story::StoryService;
pub use user::UserService;
