//! # hearth-core
//!
//! Domain layer: stories, reactions, mood tags, role assignments, analytics
//! events, push-channel change notices and the repository traits the
//! infrastructure crates implement. No database or web framework in here.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

pub use entities::{
    AnalyticsEvent, AnalyticsSummary, EventTypeTotal, KindTotal, MoodTag, PublicProfile, Reaction,
    ReactionCount, ReactionTally, Story, StoryTotal, User, UserRole,
};
pub use error::DomainError;
pub use events::{ChangeNotice, ChangeOp, ChangeTopic, DomainEvent, RowFilter, WatchedTable};
pub use traits::{
    AnalyticsRepository, MoodTagRepository, ReactionRepository, RepoResult, RoleRepository,
    StoryQuery, StoryRepository, UserRepository,
};
pub use value_objects::{ReactionKind, RoleName, Snowflake, SnowflakeGenerator, SnowflakeParseError};
