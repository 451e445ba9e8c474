//! Reaction aggregate cache
//!
//! Per-story, per-viewer projection of reaction counts. The projection is
//! never adjusted locally: every invalidation re-runs two full fetches (all
//! rows of the story, and the viewer's rows) and replaces the view.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use hearth_core::{ChangeTopic, ReactionTally, Snowflake};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::error::GatewayResult;
use crate::gateway::{RemoteGateway, SubscriptionCloser};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// No fetch has resolved yet.
    Loading,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionView {
    pub status: LoadStatus,
    pub tally: ReactionTally,
}

impl ReactionView {
    fn loading() -> Self {
        Self {
            status: LoadStatus::Loading,
            tally: ReactionTally::empty(),
        }
    }
}

/// What happened to one refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefetchOutcome {
    Applied,
    /// A fetch failed; the previous view was kept.
    Failed,
    /// Resolved after unmount and was thrown away.
    Discarded,
}

struct Listener {
    closer: SubscriptionCloser,
    task: JoinHandle<()>,
}

struct Inner {
    story_id: Snowflake,
    session: Session,
    gateway: Arc<dyn RemoteGateway>,
    view: watch::Sender<ReactionView>,
    mounted: AtomicBool,
    listening: AtomicBool,
    listener: Mutex<Option<Listener>>,
}

/// Cheap to clone; clones share one view and one subscription.
#[derive(Clone)]
pub struct ReactionAggregateCache {
    inner: Arc<Inner>,
}

impl ReactionAggregateCache {
    /// Mounted cache in the `Loading` state. Nothing is fetched until
    /// [`refresh`](Self::refresh) or [`invalidate`](Self::invalidate).
    pub fn new(gateway: Arc<dyn RemoteGateway>, session: Session, story_id: Snowflake) -> Self {
        Self {
            inner: Arc::new(Inner {
                story_id,
                session,
                gateway,
                view: watch::channel(ReactionView::loading()).0,
                mounted: AtomicBool::new(true),
                listening: AtomicBool::new(false),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Standalone cache: listens to its story's reaction topic and starts
    /// the first fetch. A failed subscription leaves a cache that only
    /// refreshes on demand.
    pub async fn mount(
        gateway: Arc<dyn RemoteGateway>,
        session: Session,
        story_id: Snowflake,
    ) -> Self {
        let cache = Self::new(gateway, session, story_id);
        if let Err(e) = cache.watch().await {
            warn!(story_id = %story_id, error = %e, "Live reaction updates unavailable");
        }
        cache.invalidate();
        cache
    }

    pub fn story_id(&self) -> Snowflake {
        self.inner.story_id
    }

    pub fn view(&self) -> ReactionView {
        self.inner.view.borrow().clone()
    }

    /// Receiver that observes every applied view.
    pub fn updates(&self) -> watch::Receiver<ReactionView> {
        self.inner.view.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::SeqCst)
    }

    pub fn is_listening(&self) -> bool {
        self.inner.listening.load(Ordering::SeqCst)
    }

    /// Open the push subscription for this story. Returns `false` when one is
    /// already live or the cache is unmounted.
    pub async fn watch(&self) -> GatewayResult<bool> {
        if !self.is_mounted() {
            return Ok(false);
        }
        if self
            .inner
            .listening
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(story_id = %self.inner.story_id, "Subscription already live");
            return Ok(false);
        }

        let topic = ChangeTopic::story_reactions(self.inner.story_id);
        let mut handle = match self.inner.gateway.subscribe(topic).await {
            Ok(handle) => handle,
            Err(e) => {
                self.inner.listening.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let closer = handle.closer();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        // Held until the listener is stored, so a stream that ends at once
        // still finds its own entry to clear.
        let mut slot = self.inner.listener.lock();
        let task = tokio::spawn(async move {
            while let Some(notice) = handle.recv().await {
                let Some(inner) = weak.upgrade() else { break };
                debug!(story_id = %inner.story_id, op = ?notice.op, "Reaction change received");
                ReactionAggregateCache { inner }.refresh().await;
            }
            if let Some(inner) = weak.upgrade() {
                ReactionAggregateCache { inner }.stream_ended(&handle.closer());
            }
        });

        // Unmounted while subscribing.
        if !self.is_mounted() {
            drop(slot);
            closer.close();
            task.abort();
            return Ok(false);
        }
        *slot = Some(Listener { closer, task });
        Ok(true)
    }

    /// Schedule a refetch in the background.
    pub fn invalidate(&self) {
        if !self.is_mounted() {
            return;
        }
        let cache = self.clone();
        tokio::spawn(async move {
            cache.refresh().await;
        });
    }

    /// Re-run both fetches and replace the view when both succeed.
    #[instrument(skip(self), fields(story_id = %self.inner.story_id))]
    pub async fn refresh(&self) -> RefetchOutcome {
        if !self.is_mounted() {
            return RefetchOutcome::Discarded;
        }

        let inner = &self.inner;
        let all = inner.gateway.list_reactions(inner.story_id);
        let mine = async {
            match inner.session.principal() {
                Some(principal) => inner
                    .gateway
                    .my_reactions(principal, inner.story_id)
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };
        let (all, mine) = tokio::join!(all, mine);

        if !self.is_mounted() {
            debug!("Discarding reaction fetch that resolved after unmount");
            return RefetchOutcome::Discarded;
        }

        match (all, mine) {
            (Ok(all), Ok(mine)) => {
                let tally = ReactionTally::from_kinds(
                    all.iter().map(|r| r.kind),
                    mine.into_iter().flatten().map(|r| r.kind),
                );
                debug!(total = tally.total(), "Reaction view refreshed");
                inner.view.send_replace(ReactionView {
                    status: LoadStatus::Ready,
                    tally,
                });
                RefetchOutcome::Applied
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Reaction fetch failed, keeping previous view");
                RefetchOutcome::Failed
            }
        }
    }

    /// Release the subscription and drop any in-flight result. Idempotent.
    pub fn unmount(&self) {
        if !self.inner.mounted.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(listener) = self.inner.listener.lock().take() {
            listener.closer.close();
            listener.task.abort();
        }
        self.inner.listening.store(false, Ordering::SeqCst);
        debug!(story_id = %self.inner.story_id, "Reaction cache unmounted");
    }

    /// The transport ended the stream; a later `watch` may subscribe again.
    fn stream_ended(&self, closer: &SubscriptionCloser) {
        let mut slot = self.inner.listener.lock();
        let ours = slot
            .as_ref()
            .is_some_and(|listener| listener.closer.same_subscription(closer));
        if !ours {
            return;
        }
        slot.take();
        closer.close();
        self.inner.listening.store(false, Ordering::SeqCst);
        warn!(story_id = %self.inner.story_id, "Reaction subscription ended");
    }
}

impl std::fmt::Debug for ReactionAggregateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionAggregateCache")
            .field("story_id", &self.inner.story_id)
            .field("mounted", &self.is_mounted())
            .field("listening", &self.is_listening())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::fixtures::story;
    use crate::gateway::MemoryGateway;
    use hearth_core::ReactionKind;
    use std::time::Duration;

    fn setup() -> (MemoryGateway, Arc<dyn RemoteGateway>) {
        let memory = MemoryGateway::new();
        memory.insert_story(story(1, &[]));
        let gateway: Arc<dyn RemoteGateway> = Arc::new(memory.clone());
        (memory, gateway)
    }

    async fn react(memory: &MemoryGateway, user: i64, kind: ReactionKind) {
        let session = memory.sign_in_as(Snowflake::new(user));
        memory
            .add_reaction(session.principal().unwrap(), Snowflake::new(1), kind)
            .await
            .unwrap();
    }

    async fn wait_until_yielded(memory: &MemoryGateway, waiting: usize) {
        for _ in 0..200 {
            if memory.waiting_calls() >= waiting {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("calls never blocked");
    }

    #[tokio::test]
    async fn starts_loading_with_zero_counts() {
        let (_memory, gateway) = setup();
        let cache = ReactionAggregateCache::new(gateway, Session::Anonymous, Snowflake::new(1));

        let view = cache.view();
        assert_eq!(view.status, LoadStatus::Loading);
        assert_eq!(view.tally.total(), 0);
        assert!(view.tally.active().is_empty());
    }

    #[tokio::test]
    async fn totals_match_rows_at_last_fetch() {
        let (memory, gateway) = setup();
        react(&memory, 10, ReactionKind::Heart).await;
        react(&memory, 11, ReactionKind::Heart).await;
        react(&memory, 10, ReactionKind::Grateful).await;

        let session = memory.sign_in_as(Snowflake::new(10));
        let cache = ReactionAggregateCache::new(gateway, session, Snowflake::new(1));
        assert_eq!(cache.refresh().await, RefetchOutcome::Applied);

        let view = cache.view();
        assert_eq!(view.status, LoadStatus::Ready);
        let rows = memory.reaction_rows(Snowflake::new(1)).len() as u64;
        assert_eq!(view.tally.total(), rows);
        assert_eq!(view.tally.count(ReactionKind::Heart), 2);
        assert!(view.tally.is_active(ReactionKind::Grateful));
        assert!(!view.tally.is_active(ReactionKind::Empathy));
    }

    #[tokio::test]
    async fn read_failure_keeps_previous_view() {
        let (memory, gateway) = setup();
        react(&memory, 10, ReactionKind::Hope).await;
        let cache = ReactionAggregateCache::new(gateway, Session::Anonymous, Snowflake::new(1));
        cache.refresh().await;

        react(&memory, 11, ReactionKind::Hope).await;
        memory.set_fail_reads(true);
        assert_eq!(cache.refresh().await, RefetchOutcome::Failed);
        assert_eq!(cache.view().tally.count(ReactionKind::Hope), 1);
    }

    #[tokio::test]
    async fn result_after_unmount_is_discarded() {
        let (memory, gateway) = setup();
        react(&memory, 10, ReactionKind::Support).await;
        let cache = ReactionAggregateCache::new(gateway, Session::Anonymous, Snowflake::new(1));

        memory.pause_reads(true);
        let pending = tokio::spawn({
            let cache = cache.clone();
            async move { cache.refresh().await }
        });
        wait_until_yielded(&memory, 1).await;

        cache.unmount();
        memory.pause_reads(false);

        assert_eq!(pending.await.unwrap(), RefetchOutcome::Discarded);
        let view = cache.view();
        assert_eq!(view.status, LoadStatus::Loading);
        assert_eq!(view.tally.total(), 0);
    }

    #[tokio::test]
    async fn at_most_one_subscription_per_instance() {
        let (memory, gateway) = setup();
        let cache = ReactionAggregateCache::new(gateway, Session::Anonymous, Snowflake::new(1));

        assert!(cache.watch().await.unwrap());
        assert!(!cache.watch().await.unwrap());
        assert!(!cache.clone().watch().await.unwrap());
        assert_eq!(memory.subscription_count(), 1);

        cache.unmount();
        cache.unmount();
        assert_eq!(memory.subscription_count(), 0);
        assert!(!cache.watch().await.unwrap());
    }

    #[tokio::test]
    async fn ended_stream_allows_resubscribe() {
        let (memory, gateway) = setup();
        let cache = ReactionAggregateCache::new(gateway, Session::Anonymous, Snowflake::new(1));
        assert!(cache.watch().await.unwrap());

        memory.disconnect_all();
        for _ in 0..200 {
            if !cache.is_listening() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!cache.is_listening());
        assert_eq!(memory.subscription_count(), 0);

        assert!(cache.watch().await.unwrap());
        assert_eq!(memory.subscription_count(), 1);

        let mut updates = cache.updates();
        react(&memory, 10, ReactionKind::Strength).await;
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                updates.changed().await.unwrap();
                if updates.borrow().tally.count(ReactionKind::Strength) == 1 {
                    break;
                }
            }
        })
        .await
        .expect("refetch after resubscribe");
        cache.unmount();
    }

    #[tokio::test]
    async fn push_notice_triggers_refetch() {
        let (memory, gateway) = setup();
        let cache = ReactionAggregateCache::mount(gateway, Session::Anonymous, Snowflake::new(1)).await;
        let mut updates = cache.updates();

        react(&memory, 10, ReactionKind::Empathy).await;

        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                updates.changed().await.unwrap();
                if updates.borrow().tally.count(ReactionKind::Empathy) == 1 {
                    break;
                }
            }
        })
        .await
        .expect("refetch after notice");
        cache.unmount();
    }
}
