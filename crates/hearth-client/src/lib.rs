//! # hearth-client
//!
//! Client-side reaction subsystem for Hearth: per-story reaction aggregate
//! caches refreshed by push notices, the toggle controller, mood query
//! composition and the paginated feed. All remote access goes through
//! [`RemoteGateway`].

pub mod error;
pub mod feed;
pub mod gateway;
pub mod models;
pub mod mood;
pub mod reactions;
pub mod session;

pub use error::{GatewayError, GatewayResult};
pub use feed::{FeedEntry, FeedList, DEFAULT_PAGE_SIZE};
pub use gateway::{
    HttpGateway, MemoryGateway, RemoteGateway, SubscriptionCloser, SubscriptionHandle,
};
pub use models::{AnalyticsEvent, Page, PublicProfile, ReactionRecord, StoryRecord};
pub use mood::{compose, MoodBoard, MoodEntry, MoodResults, MoodState};
pub use reactions::{
    LoadStatus, ReactionAggregateCache, ReactionToggleController, ReactionView, RefetchOutcome,
    ToggleNotice, ToggleOutcome,
};
pub use session::{Principal, Session};
