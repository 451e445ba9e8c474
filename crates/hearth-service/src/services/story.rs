//! Story service
//!
//! Story CRUD, the public feed, view counting and mood matching.

use hearth_core::entities::{normalize_mood_name, normalize_tags, Story};
use hearth_core::traits::StoryQuery;
use hearth_core::{DomainError, DomainEvent, Snowflake};
use tracing::{info, instrument};

use crate::dto::{
    CreateStoryRequest, FeedQuery, MatchStoriesByMoodsRequest, MatchStoriesResponse, PageResponse,
    StoryResponse, UpdateStoryRequest, ViewCountResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct StoryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> StoryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        author_id: Snowflake,
        request: CreateStoryRequest,
    ) -> ServiceResult<StoryResponse> {
        let tags = self.known_tags(request.emotion_tags).await?;

        let mut story = Story::new(self.ctx.generate_id(), author_id, request.content, tags)?;
        story.set_title(request.title)?;
        story.set_visibility(request.is_public);
        story.set_anonymous(request.is_anonymous);

        self.ctx.story_repo().create(&story).await?;

        info!(story_id = %story.id, is_public = story.is_public, "Story created");

        self.publish(DomainEvent::StoryCreated { story_id: story.id }).await;

        Ok(StoryResponse::from(&story))
    }

    /// Drafts are only visible to their author; others get not found.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        story_id: Snowflake,
        viewer: Option<Snowflake>,
    ) -> ServiceResult<StoryResponse> {
        let story = self.visible_story(story_id, viewer).await?;
        Ok(StoryResponse::from(&story))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        actor_id: Snowflake,
        story_id: Snowflake,
        request: UpdateStoryRequest,
    ) -> ServiceResult<StoryResponse> {
        let mut story = self.visible_story(story_id, Some(actor_id)).await?;
        if !story.is_authored_by(actor_id) {
            return Err(DomainError::NotStoryAuthor.into());
        }

        if let Some(title) = request.title {
            story.set_title(Some(title))?;
        }
        if let Some(content) = request.content {
            story.set_content(content)?;
        }
        if let Some(tags) = request.emotion_tags {
            let tags = self.known_tags(tags).await?;
            story.set_emotion_tags(tags)?;
        }
        if let Some(is_public) = request.is_public {
            story.set_visibility(is_public);
        }
        if let Some(is_anonymous) = request.is_anonymous {
            story.set_anonymous(is_anonymous);
        }

        self.ctx.story_repo().update(&story).await?;
        info!(story_id = %story.id, "Story updated");

        self.publish(DomainEvent::StoryUpdated { story_id }).await;

        Ok(StoryResponse::from(&story))
    }

    #[instrument(skip(self))]
    pub async fn feed(&self, query: FeedQuery) -> ServiceResult<PageResponse<StoryResponse>> {
        let query = self.story_query(query);
        let stories = self.ctx.story_repo().list_public(query).await?;
        Ok(page(&stories, query.limit))
    }

    /// The author's own stories, drafts included.
    #[instrument(skip(self))]
    pub async fn mine(
        &self,
        author_id: Snowflake,
        query: FeedQuery,
    ) -> ServiceResult<PageResponse<StoryResponse>> {
        let query = self.story_query(query);
        let stories = self.ctx.story_repo().list_by_author(author_id, query).await?;
        Ok(page(&stories, query.limit))
    }

    #[instrument(skip(self))]
    pub async fn record_view(&self, story_id: Snowflake) -> ServiceResult<ViewCountResponse> {
        let view_count = self
            .ctx
            .story_repo()
            .increment_views(story_id)
            .await?
            .ok_or(DomainError::StoryNotFound(story_id))?;

        self.publish(DomainEvent::StoryViewed { story_id }).await;

        Ok(ViewCountResponse { view_count })
    }

    /// Mood names to public story ids, newest first. No moods, no ids.
    #[instrument(skip(self, request), fields(moods = request.moods.len()))]
    pub async fn match_by_moods(
        &self,
        request: MatchStoriesByMoodsRequest,
    ) -> ServiceResult<MatchStoriesResponse> {
        let moods = normalize_moods(&request.moods);
        if moods.is_empty() {
            return Ok(MatchStoriesResponse { story_ids: Vec::new() });
        }

        let story_ids = self
            .ctx
            .story_repo()
            .match_by_moods(&moods, self.ctx.feed_config().mood_match_limit)
            .await?;

        Ok(MatchStoriesResponse { story_ids })
    }

    pub(crate) async fn visible_story(
        &self,
        story_id: Snowflake,
        viewer: Option<Snowflake>,
    ) -> ServiceResult<Story> {
        self.ctx
            .story_repo()
            .find_by_id(story_id)
            .await?
            .filter(|s| s.is_visible_to(viewer))
            .ok_or_else(|| ServiceError::Domain(DomainError::StoryNotFound(story_id)))
    }

    /// Normalizes tags and rejects any that are not in the mood vocabulary.
    async fn known_tags(&self, tags: Vec<String>) -> ServiceResult<Vec<String>> {
        let tags = normalize_tags(tags)?;
        if tags.is_empty() {
            return Ok(tags);
        }
        let existing = self.ctx.mood_tag_repo().existing_names(&tags).await?;
        let unknown: Vec<&str> = tags
            .iter()
            .filter(|t| !existing.contains(t))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(DomainError::UnknownMoodTags(unknown.join(", ")).into());
        }
        Ok(tags)
    }

    fn story_query(&self, query: FeedQuery) -> StoryQuery {
        let feed = self.ctx.feed_config();
        StoryQuery {
            before: query.before,
            limit: clamp_limit(query.limit, feed.page_size, feed.max_page_size),
        }
    }

    async fn publish(&self, event: DomainEvent) {
        self.ctx.publisher().publish_event(&event).await.ok();
    }
}

fn clamp_limit(requested: Option<i64>, default: i64, max: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, max.max(1))
}

fn page(stories: &[Story], limit: i64) -> PageResponse<StoryResponse> {
    let full = i64::try_from(stories.len()).is_ok_and(|n| n >= limit);
    PageResponse {
        data: stories.iter().map(StoryResponse::from).collect(),
        next_before: if full { stories.last().map(|s| s.id) } else { None },
    }
}

/// Lowercased, de-duplicated, invalid names dropped. Order kept.
fn normalize_moods(moods: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(moods.len());
    for mood in moods {
        if let Ok(name) = normalize_mood_name(mood) {
            if !out.contains(&name) {
                out.push(name);
            }
        }
    }
    out
}
