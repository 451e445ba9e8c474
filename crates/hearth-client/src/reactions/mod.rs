//! Reaction subsystem: aggregate cache and toggle controller

mod cache;
mod toggle;

pub use cache::{LoadStatus, ReactionAggregateCache, ReactionView, RefetchOutcome};
pub use toggle::{ReactionToggleController, ToggleNotice, ToggleOutcome};
