//! Ports implemented by the infrastructure crates

mod repositories;

pub use repositories::{
    AnalyticsRepository, MoodTagRepository, ReactionRepository, RepoResult, RoleRepository,
    StoryQuery, StoryRepository, UserRepository,
};
