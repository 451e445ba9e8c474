//! In-process gateway
//!
//! Holds stories, profiles and reactions in memory and fans change notices
//! out to subscribers the way the push gateway does. Failure and pause
//! switches let callers exercise degraded paths.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use hearth_core::{ChangeNotice, ChangeTopic, DomainEvent, ReactionKind, Snowflake};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, watch};

use super::{RemoteGateway, SubscriptionCloser, SubscriptionHandle, SUBSCRIPTION_BUFFER};
use crate::error::{GatewayError, GatewayResult};
use crate::models::{AnalyticsEvent, Page, PublicProfile, ReactionRecord, StoryRecord};
use crate::session::{Principal, Session};

type Subscribers = DashMap<u64, (ChangeTopic, mpsc::Sender<ChangeNotice>)>;

#[derive(Clone, Default)]
pub struct MemoryGateway {
    inner: Arc<Inner>,
}

struct Inner {
    stories: RwLock<BTreeMap<Snowflake, StoryRecord>>,
    profiles: RwLock<BTreeMap<Snowflake, PublicProfile>>,
    reactions: RwLock<Vec<ReactionRecord>>,
    events: Mutex<Vec<(Option<Snowflake>, AnalyticsEvent)>>,
    subscribers: Arc<Subscribers>,
    next_subscription: AtomicU64,

    unresolvable: RwLock<Vec<Snowflake>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_events: AtomicBool,
    fail_subscribe: AtomicBool,

    reads_paused: watch::Sender<bool>,
    writes_paused: watch::Sender<bool>,
    waiting: AtomicUsize,

    reaction_fetches: AtomicUsize,
    writes: AtomicUsize,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            stories: RwLock::default(),
            profiles: RwLock::default(),
            reactions: RwLock::default(),
            events: Mutex::default(),
            subscribers: Arc::default(),
            next_subscription: AtomicU64::new(1),
            unresolvable: RwLock::default(),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fail_events: AtomicBool::new(false),
            fail_subscribe: AtomicBool::new(false),
            reads_paused: watch::channel(false).0,
            writes_paused: watch::channel(false).0,
            waiting: AtomicUsize::new(0),
            reaction_fetches: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- seeding -----

    pub fn insert_story(&self, story: StoryRecord) {
        self.inner.stories.write().insert(story.id, story);
    }

    pub fn insert_profile(&self, profile: PublicProfile) {
        self.inner.profiles.write().insert(profile.id, profile);
    }

    /// Session for a user, as if they had signed in.
    pub fn sign_in_as(&self, user_id: Snowflake) -> Session {
        Session::SignedIn(Principal::new(user_id, format!("memory-{user_id}")))
    }

    /// `get_story` fails for this id from now on.
    pub fn make_unresolvable(&self, story_id: Snowflake) {
        self.inner.unresolvable.write().push(story_id);
    }

    // ----- switches -----

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_events(&self, fail: bool) {
        self.inner.fail_events.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_subscribe(&self, fail: bool) {
        self.inner.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    /// Reads block until resumed.
    pub fn pause_reads(&self, paused: bool) {
        self.inner.reads_paused.send_replace(paused);
    }

    /// Writes block until resumed.
    pub fn pause_writes(&self, paused: bool) {
        self.inner.writes_paused.send_replace(paused);
    }

    /// End every live subscription stream, as a dropped push socket would.
    pub fn disconnect_all(&self) {
        self.inner.subscribers.clear();
    }

    /// Calls currently blocked by a pause.
    pub fn waiting_calls(&self) -> usize {
        self.inner.waiting.load(Ordering::SeqCst)
    }

    // ----- inspection -----

    pub fn reaction_rows(&self, story_id: Snowflake) -> Vec<ReactionRecord> {
        self.inner
            .reactions
            .read()
            .iter()
            .filter(|r| r.story_id == story_id)
            .cloned()
            .collect()
    }

    /// Full `list_reactions` calls served so far.
    pub fn reaction_fetches(&self) -> usize {
        self.inner.reaction_fetches.load(Ordering::SeqCst)
    }

    /// Insert and delete calls that reached the store.
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    pub fn recorded_events(&self) -> Vec<AnalyticsEvent> {
        self.inner
            .events
            .lock()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Push a notice to matching subscribers, as the server would after a
    /// write made elsewhere.
    pub fn publish(&self, notice: &ChangeNotice) -> usize {
        let mut sent = 0;
        for entry in self.inner.subscribers.iter() {
            let (topic, sender) = entry.value();
            if topic.matches(notice) && sender.try_send(notice.clone()).is_ok() {
                sent += 1;
            }
        }
        sent
    }

    async fn gate(&self, paused: &watch::Sender<bool>) {
        let mut rx = paused.subscribe();
        if *rx.borrow_and_update() {
            self.inner.waiting.fetch_add(1, Ordering::SeqCst);
            rx.wait_for(|paused| !*paused).await.ok();
            self.inner.waiting.fetch_sub(1, Ordering::SeqCst);
        }
    }

    async fn before_read(&self) -> GatewayResult<()> {
        self.gate(&self.inner.reads_paused).await;
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("reads are failing".to_string()));
        }
        Ok(())
    }

    async fn before_write(&self) -> GatewayResult<()> {
        self.gate(&self.inner.writes_paused).await;
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("writes are failing".to_string()));
        }
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn story_visible(&self, story_id: Snowflake, viewer: Option<Snowflake>) -> bool {
        self.inner.stories.read().get(&story_id).is_some_and(|s| {
            s.is_public || (s.author_id.is_some() && s.author_id == viewer)
        })
    }
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    async fn list_reactions(&self, story_id: Snowflake) -> GatewayResult<Vec<ReactionRecord>> {
        self.before_read().await?;
        self.inner.reaction_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.reaction_rows(story_id))
    }

    async fn my_reactions(
        &self,
        principal: &Principal,
        story_id: Snowflake,
    ) -> GatewayResult<Vec<ReactionRecord>> {
        self.before_read().await?;
        Ok(self
            .reaction_rows(story_id)
            .into_iter()
            .filter(|r| r.user_id == principal.user_id)
            .collect())
    }

    async fn add_reaction(
        &self,
        principal: &Principal,
        story_id: Snowflake,
        kind: ReactionKind,
    ) -> GatewayResult<()> {
        self.before_write().await?;
        if !self.story_visible(story_id, Some(principal.user_id)) {
            return Err(GatewayError::NotFound);
        }

        let inserted = {
            let mut rows = self.inner.reactions.write();
            let exists = rows
                .iter()
                .any(|r| r.story_id == story_id && r.user_id == principal.user_id && r.kind == kind);
            if !exists {
                rows.push(ReactionRecord {
                    story_id,
                    user_id: principal.user_id,
                    kind,
                    created_at: Utc::now(),
                });
            }
            !exists
        };

        if inserted {
            self.publish(
                &DomainEvent::ReactionAdded {
                    story_id,
                    user_id: principal.user_id,
                    kind,
                }
                .to_notice(),
            );
        }
        Ok(())
    }

    async fn remove_reaction(
        &self,
        principal: &Principal,
        story_id: Snowflake,
        kind: ReactionKind,
    ) -> GatewayResult<()> {
        self.before_write().await?;

        let removed = {
            let mut rows = self.inner.reactions.write();
            let before = rows.len();
            rows.retain(|r| {
                !(r.story_id == story_id && r.user_id == principal.user_id && r.kind == kind)
            });
            rows.len() != before
        };

        if removed {
            self.publish(
                &DomainEvent::ReactionRemoved {
                    story_id,
                    user_id: principal.user_id,
                    kind,
                }
                .to_notice(),
            );
        }
        Ok(())
    }

    async fn list_feed(
        &self,
        before: Option<Snowflake>,
        limit: usize,
    ) -> GatewayResult<Page<StoryRecord>> {
        self.before_read().await?;
        let data: Vec<StoryRecord> = self
            .inner
            .stories
            .read()
            .values()
            .rev()
            .filter(|s| s.is_public && before.map_or(true, |b| s.id < b))
            .take(limit)
            .cloned()
            .collect();
        let next_before = if data.len() == limit {
            data.last().map(|s| s.id)
        } else {
            None
        };
        Ok(Page { data, next_before })
    }

    async fn get_story(
        &self,
        session: &Session,
        story_id: Snowflake,
    ) -> GatewayResult<StoryRecord> {
        self.before_read().await?;
        if self.inner.unresolvable.read().contains(&story_id) {
            return Err(GatewayError::Unavailable(format!("story {story_id}")));
        }
        if !self.story_visible(story_id, session.user_id()) {
            return Err(GatewayError::NotFound);
        }
        self.inner
            .stories
            .read()
            .get(&story_id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn get_profile(&self, user_id: Snowflake) -> GatewayResult<PublicProfile> {
        self.before_read().await?;
        self.inner
            .profiles
            .read()
            .get(&user_id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn match_stories_by_moods(&self, moods: &[String]) -> GatewayResult<Vec<Snowflake>> {
        self.before_read().await?;
        let wanted: Vec<String> = moods.iter().map(|m| m.trim().to_lowercase()).collect();
        Ok(self
            .inner
            .stories
            .read()
            .values()
            .rev()
            .filter(|s| {
                s.is_public
                    && s.emotion_tags
                        .iter()
                        .any(|tag| wanted.contains(&tag.to_lowercase()))
            })
            .map(|s| s.id)
            .collect())
    }

    async fn record_event(&self, session: &Session, event: &AnalyticsEvent) -> GatewayResult<()> {
        if self.inner.fail_events.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("analytics is failing".to_string()));
        }
        self.inner
            .events
            .lock()
            .push((session.user_id(), event.clone()));
        Ok(())
    }

    async fn subscribe(&self, topic: ChangeTopic) -> GatewayResult<SubscriptionHandle> {
        if self.inner.fail_subscribe.load(Ordering::SeqCst) {
            return Err(GatewayError::ChannelClosed);
        }
        topic.validate()?;

        let id = self.inner.next_subscription.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        self.inner.subscribers.insert(id, (topic.clone(), tx));

        let subscribers = Arc::clone(&self.inner.subscribers);
        let closer = SubscriptionCloser::new(move || {
            subscribers.remove(&id);
        });
        Ok(SubscriptionHandle::new(topic, rx, closer))
    }
}

impl std::fmt::Debug for MemoryGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryGateway")
            .field("stories", &self.inner.stories.read().len())
            .field("subscriptions", &self.subscription_count())
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::story;
    use super::*;
    use hearth_core::WatchedTable;

    #[tokio::test]
    async fn writes_notify_matching_topics_only() {
        let gateway = MemoryGateway::new();
        gateway.insert_story(story(1, &[]));
        gateway.insert_story(story(2, &[]));
        let session = gateway.sign_in_as(Snowflake::new(7));
        let principal = session.principal().unwrap();

        let mut one = gateway
            .subscribe(ChangeTopic::story_reactions(Snowflake::new(1)))
            .await
            .unwrap();
        let mut table = gateway
            .subscribe(ChangeTopic::table(WatchedTable::Reactions))
            .await
            .unwrap();

        gateway
            .add_reaction(principal, Snowflake::new(2), ReactionKind::Hope)
            .await
            .unwrap();
        let notice = table.recv().await.unwrap();
        assert_eq!(notice.key_value("story_id"), Some("2"));
        assert!(one.notices.try_recv().is_err());
    }

    #[tokio::test]
    async fn duplicate_insert_is_silent() {
        let gateway = MemoryGateway::new();
        gateway.insert_story(story(1, &[]));
        let session = gateway.sign_in_as(Snowflake::new(7));
        let principal = session.principal().unwrap();
        let mut handle = gateway
            .subscribe(ChangeTopic::story_reactions(Snowflake::new(1)))
            .await
            .unwrap();

        for _ in 0..2 {
            gateway
                .add_reaction(principal, Snowflake::new(1), ReactionKind::Heart)
                .await
                .unwrap();
        }
        assert_eq!(gateway.reaction_rows(Snowflake::new(1)).len(), 1);
        assert!(handle.recv().await.is_some());
        assert!(handle.notices.try_recv().is_err());
    }

    #[tokio::test]
    async fn closing_handle_removes_subscriber() {
        let gateway = MemoryGateway::new();
        let mut handle = gateway
            .subscribe(ChangeTopic::table(WatchedTable::Stories))
            .await
            .unwrap();
        assert_eq!(gateway.subscription_count(), 1);

        handle.close();
        assert_eq!(gateway.subscription_count(), 0);
        assert!(handle.recv().await.is_none());
    }

    #[tokio::test]
    async fn feed_pages_newest_first() {
        let gateway = MemoryGateway::new();
        for id in 1..=5 {
            gateway.insert_story(story(id, &[]));
        }

        let first = gateway.list_feed(None, 2).await.unwrap();
        let ids: Vec<i64> = first.data.iter().map(|s| s.id.into_inner()).collect();
        assert_eq!(ids, vec![5, 4]);
        assert_eq!(first.next_before, Some(Snowflake::new(4)));

        let last = gateway.list_feed(Some(Snowflake::new(2)), 2).await.unwrap();
        assert_eq!(last.data.len(), 1);
        assert_eq!(last.next_before, None);
    }
}
