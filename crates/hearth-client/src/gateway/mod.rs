//! Remote data gateway
//!
//! Every read and write the client views make goes through [`RemoteGateway`].
//! Change notifications arrive on a [`SubscriptionHandle`].

mod http;
pub(crate) mod memory;

pub use http::HttpGateway;
pub use memory::MemoryGateway;

use std::sync::Arc;

use async_trait::async_trait;
use hearth_core::{ChangeNotice, ChangeTopic, ReactionKind, Snowflake};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::GatewayResult;
use crate::models::{AnalyticsEvent, Page, PublicProfile, ReactionRecord, StoryRecord};
use crate::session::{Principal, Session};

/// Notices buffered per subscription before the oldest are dropped by the
/// transport.
pub const SUBSCRIPTION_BUFFER: usize = 64;

#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// All reaction rows of a story.
    async fn list_reactions(&self, story_id: Snowflake) -> GatewayResult<Vec<ReactionRecord>>;

    /// Rows held by the principal on a story.
    async fn my_reactions(
        &self,
        principal: &Principal,
        story_id: Snowflake,
    ) -> GatewayResult<Vec<ReactionRecord>>;

    async fn add_reaction(
        &self,
        principal: &Principal,
        story_id: Snowflake,
        kind: ReactionKind,
    ) -> GatewayResult<()>;

    async fn remove_reaction(
        &self,
        principal: &Principal,
        story_id: Snowflake,
        kind: ReactionKind,
    ) -> GatewayResult<()>;

    /// Public stories, newest first, strictly older than `before`.
    async fn list_feed(
        &self,
        before: Option<Snowflake>,
        limit: usize,
    ) -> GatewayResult<Page<StoryRecord>>;

    async fn get_story(&self, session: &Session, story_id: Snowflake)
        -> GatewayResult<StoryRecord>;

    async fn get_profile(&self, user_id: Snowflake) -> GatewayResult<PublicProfile>;

    /// Story ids matching any of the moods, in server order.
    async fn match_stories_by_moods(&self, moods: &[String]) -> GatewayResult<Vec<Snowflake>>;

    async fn record_event(&self, session: &Session, event: &AnalyticsEvent) -> GatewayResult<()>;

    async fn subscribe(&self, topic: ChangeTopic) -> GatewayResult<SubscriptionHandle>;
}

type CloseFn = Box<dyn FnOnce() + Send>;

/// Releases a subscription on the transport. Clones share the same
/// one-shot close.
#[derive(Clone)]
pub struct SubscriptionCloser(Arc<Mutex<Option<CloseFn>>>);

impl SubscriptionCloser {
    pub(crate) fn new(close: impl FnOnce() + Send + 'static) -> Self {
        Self(Arc::new(Mutex::new(Some(Box::new(close)))))
    }

    /// Returns `true` only for the call that actually closed.
    pub fn close(&self) -> bool {
        let close = self.0.lock().take();
        match close {
            Some(close) => {
                close();
                true
            }
            None => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.0.lock().is_none()
    }

    /// Whether both closers release the same subscription.
    pub fn same_subscription(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for SubscriptionCloser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionCloser")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Owned push subscription on one topic.
///
/// Closing is explicit and idempotent; dropping the handle closes it too.
#[derive(Debug)]
pub struct SubscriptionHandle {
    topic: ChangeTopic,
    notices: mpsc::Receiver<ChangeNotice>,
    closer: SubscriptionCloser,
}

impl SubscriptionHandle {
    pub(crate) fn new(
        topic: ChangeTopic,
        notices: mpsc::Receiver<ChangeNotice>,
        closer: SubscriptionCloser,
    ) -> Self {
        Self {
            topic,
            notices,
            closer,
        }
    }

    pub fn topic(&self) -> &ChangeTopic {
        &self.topic
    }

    /// Next notice; `None` once the subscription is closed.
    pub async fn recv(&mut self) -> Option<ChangeNotice> {
        self.notices.recv().await
    }

    pub fn closer(&self) -> SubscriptionCloser {
        self.closer.clone()
    }

    pub fn close(&mut self) -> bool {
        self.notices.close();
        self.closer.close()
    }

    pub fn is_closed(&self) -> bool {
        self.closer.is_closed()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.closer.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::WatchedTable;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn close_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let (_tx, rx) = mpsc::channel(1);
        let mut handle = SubscriptionHandle::new(
            ChangeTopic::table(WatchedTable::Reactions),
            rx,
            SubscriptionCloser::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert!(handle.close());
        assert!(!handle.close());
        assert!(handle.is_closed());
        drop(handle);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_closes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let (_tx, rx) = mpsc::channel(1);
        let handle = SubscriptionHandle::new(
            ChangeTopic::table(WatchedTable::Stories),
            rx,
            SubscriptionCloser::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let closer = handle.closer();

        drop(handle);
        assert!(closer.is_closed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
