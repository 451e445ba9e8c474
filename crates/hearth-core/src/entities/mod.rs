//! Domain entities - core business objects

mod analytics;
mod mood_tag;
mod reaction;
mod role;
mod story;
mod user;

pub use analytics::{AnalyticsEvent, AnalyticsSummary, EventTypeTotal, KindTotal, StoryTotal};
pub use mood_tag::{normalize_mood_name, MoodTag};
pub use reaction::{Reaction, ReactionCount, ReactionTally};
pub use role::{can_moderate, has_admin, UserRole};
pub use story::{normalize_tags, Story, MAX_EMOTION_TAGS, MAX_STORY_CONTENT, MAX_STORY_TITLE};
pub use user::{normalize_email, PublicProfile, User};
