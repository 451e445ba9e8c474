//! Database models - SQLx-compatible structs for PostgreSQL tables

mod analytics;
mod mood_tag;
mod reaction;
mod role;
mod story;
mod user;

pub use analytics::{EventTypeCountModel, StoryCountsModel};
pub use mood_tag::MoodTagModel;
pub use reaction::{KindCountModel, ReactionModel, StoryReactionTotalModel};
pub use role::UserRoleModel;
pub use story::StoryModel;
pub use user::UserModel;
