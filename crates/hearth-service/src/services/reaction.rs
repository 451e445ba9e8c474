//! Reaction service
//!
//! Reaction rows per story and viewer, server-side summaries, and the
//! insert/delete pair behind reaction toggles. Every successful write
//! publishes a change notice keyed by `story_id`.

use hearth_core::entities::{Reaction, ReactionTally};
use hearth_core::{DomainEvent, ReactionKind, Snowflake};
use tracing::{debug, info, instrument};

use crate::dto::{ReactionResponse, ReactionSummaryResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::story::StoryService;

pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// All reaction rows of a story.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        story_id: Snowflake,
        viewer: Option<Snowflake>,
    ) -> ServiceResult<Vec<ReactionResponse>> {
        StoryService::new(self.ctx).visible_story(story_id, viewer).await?;
        let rows = self.ctx.reaction_repo().find_by_story(story_id).await?;
        Ok(rows.iter().map(ReactionResponse::from).collect())
    }

    /// The viewer's own rows for a story.
    #[instrument(skip(self))]
    pub async fn mine(
        &self,
        story_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<ReactionResponse>> {
        StoryService::new(self.ctx)
            .visible_story(story_id, Some(user_id))
            .await?;
        let rows = self
            .ctx
            .reaction_repo()
            .find_by_story_and_user(story_id, user_id)
            .await?;
        Ok(rows.iter().map(ReactionResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn summary(
        &self,
        story_id: Snowflake,
        viewer: Option<Snowflake>,
    ) -> ServiceResult<ReactionSummaryResponse> {
        StoryService::new(self.ctx).visible_story(story_id, viewer).await?;

        let counts = self.ctx.reaction_repo().count_by_kind(story_id).await?;
        let mine = match viewer {
            Some(user_id) => {
                self.ctx
                    .reaction_repo()
                    .find_by_story_and_user(story_id, user_id)
                    .await?
            }
            None => Vec::new(),
        };

        let tally = ReactionTally::from_counts(counts, mine.iter().map(|r| r.kind));

        Ok(ReactionSummaryResponse {
            story_id,
            total: tally.total(),
            counts: tally.counts(),
        })
    }

    /// Idempotent; re-adding a held kind changes nothing and publishes nothing.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        story_id: Snowflake,
        user_id: Snowflake,
        kind: ReactionKind,
    ) -> ServiceResult<()> {
        StoryService::new(self.ctx)
            .visible_story(story_id, Some(user_id))
            .await?;

        let reaction = Reaction::new(story_id, user_id, kind);
        if !self.ctx.reaction_repo().create(&reaction).await? {
            debug!("Reaction already present");
            return Ok(());
        }

        info!(story_id = %story_id, user_id = %user_id, kind = %kind, "Reaction added");

        self.ctx
            .publisher()
            .publish_event(&DomainEvent::ReactionAdded {
                story_id,
                user_id,
                kind,
            })
            .await
            .ok();

        Ok(())
    }

    /// Idempotent; removing an absent kind is not an error.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        story_id: Snowflake,
        user_id: Snowflake,
        kind: ReactionKind,
    ) -> ServiceResult<()> {
        StoryService::new(self.ctx)
            .visible_story(story_id, Some(user_id))
            .await?;

        if !self
            .ctx
            .reaction_repo()
            .delete(story_id, user_id, kind)
            .await?
        {
            debug!("Reaction was not present");
            return Ok(());
        }

        info!(story_id = %story_id, user_id = %user_id, kind = %kind, "Reaction removed");

        self.ctx
            .publisher()
            .publish_event(&DomainEvent::ReactionRemoved {
                story_id,
                user_id,
                kind,
            })
            .await
            .ok();

        Ok(())
    }
}
