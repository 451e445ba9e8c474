//! Mood query composition
//!
//! Selected moods go to the `match_stories_by_moods` RPC; every returned id
//! is resolved to its story and, for named authors, their public profile.
//! Records that fail to resolve are left out and counted.

use std::sync::Arc;

use futures::future::join_all;
use hearth_core::Snowflake;
use tracing::{debug, instrument, warn};

use crate::error::GatewayResult;
use crate::gateway::RemoteGateway;
use crate::models::{PublicProfile, StoryRecord};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodEntry {
    pub story: StoryRecord,
    /// `None` for anonymous stories.
    pub author: Option<PublicProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoodResults {
    /// In RPC order.
    pub entries: Vec<MoodEntry>,
    pub unresolved: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoodState {
    /// Nothing selected; the view asks the reader to pick a mood.
    Prompt,
    Ready(MoodResults),
}

impl MoodState {
    pub fn entries(&self) -> &[MoodEntry] {
        match self {
            Self::Prompt => &[],
            Self::Ready(results) => &results.entries,
        }
    }
}

/// Run the composition once for `moods`.
#[instrument(skip(gateway, session))]
pub async fn compose(
    gateway: &dyn RemoteGateway,
    session: &Session,
    moods: &[String],
) -> GatewayResult<MoodResults> {
    if moods.is_empty() {
        return Ok(MoodResults::default());
    }

    let ids = gateway.match_stories_by_moods(moods).await?;
    let resolved = join_all(ids.iter().map(|&id| resolve(gateway, session, id))).await;

    let mut results = MoodResults::default();
    for (id, entry) in ids.iter().zip(resolved) {
        match entry {
            Ok(entry) => results.entries.push(entry),
            Err(e) => {
                debug!(story_id = %id, error = %e, "Dropping unresolved mood result");
                results.unresolved += 1;
            }
        }
    }
    if results.unresolved > 0 {
        warn!(
            unresolved = results.unresolved,
            matched = ids.len(),
            "Some mood results could not be resolved"
        );
    }
    Ok(results)
}

async fn resolve(
    gateway: &dyn RemoteGateway,
    session: &Session,
    story_id: Snowflake,
) -> GatewayResult<MoodEntry> {
    let story = gateway.get_story(session, story_id).await?;
    let author = match story.visible_author() {
        Some(author_id) => Some(gateway.get_profile(author_id).await?),
        None => None,
    };
    Ok(MoodEntry { story, author })
}

/// Mood selection with its current result set.
pub struct MoodBoard {
    gateway: Arc<dyn RemoteGateway>,
    session: Session,
    selection: Vec<String>,
    state: MoodState,
}

impl MoodBoard {
    pub fn new(gateway: Arc<dyn RemoteGateway>, session: Session) -> Self {
        Self {
            gateway,
            session,
            selection: Vec::new(),
            state: MoodState::Prompt,
        }
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn state(&self) -> &MoodState {
        &self.state
    }

    /// Select the mood, or deselect it if already selected, then re-query.
    pub async fn toggle_mood(&mut self, mood: &str) -> &MoodState {
        let mood = mood.trim().to_lowercase();
        if let Some(index) = self.selection.iter().position(|m| *m == mood) {
            self.selection.remove(index);
        } else if !mood.is_empty() {
            self.selection.push(mood);
        }
        self.refresh().await
    }

    pub async fn clear(&mut self) -> &MoodState {
        self.selection.clear();
        self.refresh().await
    }

    /// Re-run the composition for the current selection. A failed RPC keeps
    /// the previous results.
    pub async fn refresh(&mut self) -> &MoodState {
        if self.selection.is_empty() {
            self.state = MoodState::Prompt;
            return &self.state;
        }

        match compose(self.gateway.as_ref(), &self.session, &self.selection).await {
            Ok(results) => self.state = MoodState::Ready(results),
            Err(e) => warn!(error = %e, "Mood query failed, keeping previous results"),
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::fixtures::{profile, story};
    use crate::gateway::MemoryGateway;

    fn setup() -> (MemoryGateway, MoodBoard) {
        let memory = MemoryGateway::new();
        let mut anonymous = story(1, &["hopeful"]);
        anonymous.is_anonymous = true;
        memory.insert_story(anonymous);
        memory.insert_story(story(2, &["calm"]));
        memory.insert_story(story(3, &["hopeful", "calm"]));
        memory.insert_profile(profile(1003));
        memory.insert_profile(profile(1002));

        let board = MoodBoard::new(Arc::new(memory.clone()), Session::Anonymous);
        (memory, board)
    }

    fn ids(state: &MoodState) -> Vec<i64> {
        state.entries().iter().map(|e| e.story.id.into_inner()).collect()
    }

    #[tokio::test]
    async fn empty_selection_is_prompt() {
        let (_memory, mut board) = setup();
        assert_eq!(board.state(), &MoodState::Prompt);
        assert_eq!(board.refresh().await, &MoodState::Prompt);
        assert!(board.state().entries().is_empty());
    }

    #[tokio::test]
    async fn select_then_deselect_returns_to_prompt() {
        let (_memory, mut board) = setup();
        let initial = board.state().clone();

        let state = board.toggle_mood("hopeful").await.clone();
        assert_eq!(ids(&state), vec![3, 1]);

        assert_eq!(board.toggle_mood("hopeful").await, &initial);
        assert!(board.selection().is_empty());
    }

    #[tokio::test]
    async fn anonymous_stories_have_no_author() {
        let (_memory, mut board) = setup();
        let state = board.toggle_mood("Hopeful").await;

        let entries = state.entries();
        assert_eq!(entries[0].author.as_ref().map(|p| p.id), Some(Snowflake::new(1003)));
        assert!(entries[1].author.is_none());
    }

    #[tokio::test]
    async fn unresolved_records_are_dropped_and_counted() {
        let (memory, mut board) = setup();
        memory.make_unresolvable(Snowflake::new(3));

        let state = board.toggle_mood("calm").await;
        let MoodState::Ready(results) = state else {
            panic!("expected results");
        };
        assert_eq!(ids(state), vec![2]);
        assert_eq!(results.unresolved, 1);
    }

    #[tokio::test]
    async fn missing_profile_drops_record() {
        let memory = MemoryGateway::new();
        memory.insert_story(story(5, &["tender"]));
        let results = compose(&memory, &Session::Anonymous, &["tender".to_string()])
            .await
            .unwrap();
        assert!(results.entries.is_empty());
        assert_eq!(results.unresolved, 1);
    }

    #[tokio::test]
    async fn refresh_reruns_composition() {
        let (memory, mut board) = setup();
        board.toggle_mood("calm").await;
        assert_eq!(ids(board.state()), vec![3, 2]);

        memory.insert_story(story(4, &["calm"]));
        memory.insert_profile(profile(1004));
        assert_eq!(ids(board.refresh().await), vec![4, 3, 2]);
    }

    #[tokio::test]
    async fn rpc_failure_keeps_previous_results() {
        let (memory, mut board) = setup();
        board.toggle_mood("calm").await;
        let before = board.state().clone();

        memory.set_fail_reads(true);
        assert_eq!(board.toggle_mood("hopeful").await, &before);
    }
}
