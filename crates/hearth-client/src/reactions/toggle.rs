//! Reaction toggle controller
//!
//! Turns a tap on a reaction into an insert or a delete. Local counts are
//! never touched; the aggregate cache picks the write up from the push
//! channel.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hearth_core::{ReactionKind, Snowflake};
use tracing::{debug, info, warn};

use super::cache::ReactionAggregateCache;
use crate::gateway::RemoteGateway;
use crate::models::AnalyticsEvent;
use crate::session::Session;

/// Message surfaced to the user instead of a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleNotice {
    SignInRequired,
    RetryLater,
}

impl ToggleNotice {
    pub fn message(self) -> &'static str {
        match self {
            Self::SignInRequired => "Please sign in to react to stories",
            Self::RetryLater => "Something went wrong. Please try again.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// A toggle for the same story and kind is still in flight.
    Ignored,
    Notice(ToggleNotice),
}

type PairKey = (Snowflake, ReactionKind);

/// Releases the in-flight slot when the toggle resolves or is cancelled.
struct InFlight {
    pending: Arc<DashMap<PairKey, ()>>,
    key: PairKey,
}

impl InFlight {
    fn claim(pending: &Arc<DashMap<PairKey, ()>>, key: PairKey) -> Option<Self> {
        match pending.entry(key) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(Self {
                    pending: Arc::clone(pending),
                    key,
                })
            }
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.pending.remove(&self.key);
    }
}

pub struct ReactionToggleController {
    gateway: Arc<dyn RemoteGateway>,
    session: Session,
    pending: Arc<DashMap<PairKey, ()>>,
}

impl ReactionToggleController {
    pub fn new(gateway: Arc<dyn RemoteGateway>, session: Session) -> Self {
        Self {
            gateway,
            session,
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Toggle against what the cache currently displays.
    pub async fn toggle(&self, cache: &ReactionAggregateCache, kind: ReactionKind) -> ToggleOutcome {
        let held = cache.view().tally.is_active(kind);
        self.toggle_kind(cache.story_id(), kind, held).await
    }

    /// `held` is whether the viewer is shown as holding `kind`.
    pub async fn toggle_kind(
        &self,
        story_id: Snowflake,
        kind: ReactionKind,
        held: bool,
    ) -> ToggleOutcome {
        let Some(principal) = self.session.principal() else {
            return ToggleOutcome::Notice(ToggleNotice::SignInRequired);
        };
        let Some(_slot) = InFlight::claim(&self.pending, (story_id, kind)) else {
            debug!(story_id = %story_id, kind = %kind, "Toggle already in flight");
            return ToggleOutcome::Ignored;
        };

        let result = if held {
            self.gateway.remove_reaction(principal, story_id, kind).await
        } else {
            self.gateway.add_reaction(principal, story_id, kind).await
        };

        match result {
            Ok(()) if held => {
                info!(story_id = %story_id, kind = %kind, "Reaction removed");
                ToggleOutcome::Removed
            }
            Ok(()) => {
                info!(story_id = %story_id, kind = %kind, "Reaction added");
                self.emit_reaction_added(story_id, kind);
                ToggleOutcome::Added
            }
            Err(e) if e.is_auth() => ToggleOutcome::Notice(ToggleNotice::SignInRequired),
            Err(e) => {
                warn!(story_id = %story_id, kind = %kind, error = %e, "Reaction toggle failed");
                ToggleOutcome::Notice(ToggleNotice::RetryLater)
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    fn emit_reaction_added(&self, story_id: Snowflake, kind: ReactionKind) {
        let gateway = Arc::clone(&self.gateway);
        let session = self.session.clone();
        let event = AnalyticsEvent::reaction_added(story_id, kind);
        tokio::spawn(async move {
            if let Err(e) = gateway.record_event(&session, &event).await {
                debug!(error = %e, "Analytics emission failed");
            }
        });
    }
}
