//! Feed list
//!
//! Pages of public stories, newest first. Each entry carries its own
//! reaction aggregate cache; the feed holds a single subscription on the
//! reactions table and routes notices to the affected caches.

use std::sync::Arc;

use dashmap::DashMap;
use hearth_core::{ChangeNotice, ChangeTopic, Snowflake, WatchedTable};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::GatewayResult;
use crate::gateway::{RemoteGateway, SubscriptionCloser};
use crate::models::StoryRecord;
use crate::reactions::ReactionAggregateCache;
use crate::session::Session;

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub story: StoryRecord,
    pub reactions: ReactionAggregateCache,
}

type Caches = Arc<DashMap<Snowflake, ReactionAggregateCache>>;

pub struct FeedList {
    gateway: Arc<dyn RemoteGateway>,
    session: Session,
    page_size: usize,
    entries: Vec<FeedEntry>,
    caches: Caches,
    next_before: Option<Snowflake>,
    exhausted: bool,
    closed: bool,
    closer: Option<SubscriptionCloser>,
    router: Option<JoinHandle<()>>,
}

impl FeedList {
    /// Subscribe to reaction changes and load the first page. Neither failure
    /// is fatal: the feed stays usable and can be reloaded.
    pub async fn open(gateway: Arc<dyn RemoteGateway>, session: Session, page_size: usize) -> Self {
        let mut feed = Self {
            gateway,
            session,
            page_size: page_size.max(1),
            entries: Vec::new(),
            caches: Arc::new(DashMap::new()),
            next_before: None,
            exhausted: false,
            closed: false,
            closer: None,
            router: None,
        };

        if let Err(e) = feed.listen().await {
            warn!(error = %e, "Live reaction updates unavailable for feed");
        }

        if let Err(e) = feed.load_more().await {
            warn!(error = %e, "Failed to load first feed page");
        }
        feed
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    pub fn is_live(&self) -> bool {
        self.closer.as_ref().is_some_and(|c| !c.is_closed())
    }

    /// Subscribe to the reactions table unless already live. The router
    /// releases the subscription when the transport ends the stream, so
    /// `is_live` turns false and this can be called again.
    pub async fn listen(&mut self) -> GatewayResult<bool> {
        if self.closed || self.is_live() {
            return Ok(false);
        }
        if let Some(router) = self.router.take() {
            router.abort();
        }

        let mut handle = self
            .gateway
            .subscribe(ChangeTopic::table(WatchedTable::Reactions))
            .await?;
        let closer = handle.closer();
        let caches = Arc::clone(&self.caches);
        self.router = Some(tokio::spawn(async move {
            while let Some(notice) = handle.recv().await {
                route(&caches, &notice);
            }
            if handle.close() {
                warn!("Feed reaction subscription ended");
            }
        }));
        self.closer = Some(closer);
        Ok(true)
    }

    pub fn cache(&self, story_id: Snowflake) -> Option<ReactionAggregateCache> {
        self.caches.get(&story_id).map(|c| c.clone())
    }

    /// Fetch the next page. Returns how many entries were appended.
    pub async fn load_more(&mut self) -> GatewayResult<usize> {
        if self.exhausted || self.closed {
            return Ok(0);
        }

        let page = self
            .gateway
            .list_feed(self.next_before, self.page_size)
            .await?;

        let mut appended = 0;
        for story in page.data {
            if self.caches.contains_key(&story.id) {
                continue;
            }
            let cache =
                ReactionAggregateCache::new(Arc::clone(&self.gateway), self.session.clone(), story.id);
            cache.invalidate();
            self.caches.insert(story.id, cache.clone());
            self.entries.push(FeedEntry {
                story,
                reactions: cache,
            });
            appended += 1;
        }

        self.next_before = page.next_before;
        self.exhausted = page.next_before.is_none();
        debug!(appended, has_more = !self.exhausted, "Feed page loaded");
        Ok(appended)
    }

    /// Drop every entry and start again from the newest story.
    pub async fn reload(&mut self) -> GatewayResult<usize> {
        self.unmount_entries();
        self.next_before = None;
        self.exhausted = false;
        self.load_more().await
    }

    /// Unmount every cache and release the subscription. Idempotent.
    pub fn close(&mut self) {
        self.unmount_entries();
        self.closed = true;
        if let Some(closer) = self.closer.take() {
            closer.close();
        }
        if let Some(router) = self.router.take() {
            router.abort();
            info!("Feed closed");
        }
    }

    fn unmount_entries(&mut self) {
        for entry in self.entries.drain(..) {
            entry.reactions.unmount();
        }
        self.caches.clear();
    }
}

impl Drop for FeedList {
    fn drop(&mut self) {
        self.close();
    }
}

/// A notice without a story key invalidates every cache.
fn route(caches: &Caches, notice: &ChangeNotice) {
    let story_id = notice
        .key_value("story_id")
        .and_then(|value| Snowflake::parse(value).ok());

    match story_id {
        Some(story_id) => {
            if let Some(cache) = caches.get(&story_id) {
                cache.invalidate();
            }
        }
        None => {
            for cache in caches.iter() {
                cache.invalidate();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::fixtures::story;
    use crate::gateway::MemoryGateway;
    use crate::reactions::LoadStatus;
    use hearth_core::{ChangeOp, ReactionKind};
    use std::time::Duration;

    fn seeded(count: i64) -> MemoryGateway {
        let memory = MemoryGateway::new();
        for id in 1..=count {
            memory.insert_story(story(id, &[]));
        }
        memory
    }

    async fn wait_for<F: Fn() -> bool>(condition: F) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition never met");
    }

    #[tokio::test]
    async fn pages_newest_first_until_exhausted() {
        let memory = seeded(5);
        let mut feed = FeedList::open(Arc::new(memory.clone()), Session::Anonymous, 2).await;

        let ids = |feed: &FeedList| -> Vec<i64> {
            feed.entries().iter().map(|e| e.story.id.into_inner()).collect()
        };
        assert_eq!(ids(&feed), vec![5, 4]);
        assert_eq!(feed.load_more().await.unwrap(), 2);
        assert_eq!(feed.load_more().await.unwrap(), 1);
        assert_eq!(ids(&feed), vec![5, 4, 3, 2, 1]);
        assert!(!feed.has_more());
        assert_eq!(feed.load_more().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn each_entry_loads_its_counts() {
        let memory = seeded(2);
        let reader = memory.sign_in_as(Snowflake::new(9));
        memory
            .add_reaction(reader.principal().unwrap(), Snowflake::new(2), ReactionKind::Heart)
            .await
            .unwrap();

        let feed = FeedList::open(Arc::new(memory.clone()), Session::Anonymous, 10).await;
        let cache = feed.cache(Snowflake::new(2)).unwrap();
        wait_for(|| cache.view().status == LoadStatus::Ready).await;
        assert_eq!(cache.view().tally.count(ReactionKind::Heart), 1);
    }

    #[tokio::test]
    async fn notices_refresh_only_the_affected_story() {
        let memory = seeded(2);
        let feed = FeedList::open(Arc::new(memory.clone()), Session::Anonymous, 10).await;
        assert_eq!(memory.subscription_count(), 1);
        wait_for(|| memory.reaction_fetches() == 2).await;

        let reader = memory.sign_in_as(Snowflake::new(9));
        memory
            .add_reaction(reader.principal().unwrap(), Snowflake::new(1), ReactionKind::Support)
            .await
            .unwrap();

        let cache = feed.cache(Snowflake::new(1)).unwrap();
        wait_for(|| cache.view().tally.count(ReactionKind::Support) == 1).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(memory.reaction_fetches(), 3);
    }

    #[tokio::test]
    async fn keyless_notice_refreshes_every_cache() {
        let memory = seeded(3);
        let _feed = FeedList::open(Arc::new(memory.clone()), Session::Anonymous, 10).await;
        wait_for(|| memory.reaction_fetches() == 3).await;

        memory.publish(&ChangeNotice::new(WatchedTable::Reactions, ChangeOp::Delete));
        wait_for(|| memory.reaction_fetches() == 6).await;
    }

    #[tokio::test]
    async fn close_unmounts_caches_and_releases_subscription() {
        let memory = seeded(2);
        let mut feed = FeedList::open(Arc::new(memory.clone()), Session::Anonymous, 10).await;
        let cache = feed.cache(Snowflake::new(1)).unwrap();
        assert!(feed.is_live());

        feed.close();
        feed.close();
        assert!(!cache.is_mounted());
        assert!(feed.is_empty());
        assert!(!feed.is_live());
        assert_eq!(memory.subscription_count(), 0);
        assert_eq!(feed.load_more().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ended_stream_goes_offline_until_relisten() {
        let memory = seeded(1);
        let mut feed = FeedList::open(Arc::new(memory.clone()), Session::Anonymous, 10).await;
        assert!(!feed.listen().await.unwrap());

        memory.disconnect_all();
        wait_for(|| !feed.is_live()).await;

        assert!(feed.listen().await.unwrap());
        assert!(feed.is_live());
        assert_eq!(memory.subscription_count(), 1);
    }

    #[tokio::test]
    async fn subscription_failure_still_loads_page() {
        let memory = seeded(1);
        memory.set_fail_subscribe(true);
        let feed = FeedList::open(Arc::new(memory.clone()), Session::Anonymous, 10).await;
        assert_eq!(feed.len(), 1);
        assert!(!feed.is_live());
    }
}
