//! Mood tag service
//!
//! Public listing; create, update and delete are admin only.

use hearth_core::entities::MoodTag;
use hearth_core::{DomainError, DomainEvent, Snowflake};
use tracing::{info, instrument};

use crate::dto::{CreateMoodTagRequest, MoodTagResponse, UpdateMoodTagRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::role::RoleService;

pub struct MoodTagService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MoodTagService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<Vec<MoodTagResponse>> {
        let tags = self.ctx.mood_tag_repo().list().await?;
        Ok(tags.iter().map(MoodTagResponse::from).collect())
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        actor_id: Snowflake,
        request: CreateMoodTagRequest,
    ) -> ServiceResult<MoodTagResponse> {
        RoleService::new(self.ctx).require_admin(actor_id).await?;

        let tag = MoodTag::new(
            self.ctx.generate_id(),
            &request.name,
            request.description,
            &request.color,
        )?;
        self.ctx.mood_tag_repo().create(&tag).await?;

        info!(tag_id = %tag.id, name = %tag.name, "Mood tag created");
        self.publish(DomainEvent::MoodTagCreated { tag_id: tag.id }).await;

        Ok(MoodTagResponse::from(&tag))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        actor_id: Snowflake,
        tag_id: Snowflake,
        request: UpdateMoodTagRequest,
    ) -> ServiceResult<MoodTagResponse> {
        RoleService::new(self.ctx).require_admin(actor_id).await?;

        let mut tag = self
            .ctx
            .mood_tag_repo()
            .find_by_id(tag_id)
            .await?
            .ok_or(DomainError::MoodTagNotFound(tag_id))?;

        if let Some(name) = request.name {
            tag.rename(&name)?;
        }
        if let Some(description) = request.description {
            tag.set_description(Some(description))?;
        }
        if let Some(color) = request.color {
            tag.set_color(&color)?;
        }

        self.ctx.mood_tag_repo().update(&tag).await?;

        info!(tag_id = %tag.id, "Mood tag updated");
        self.publish(DomainEvent::MoodTagUpdated { tag_id }).await;

        Ok(MoodTagResponse::from(&tag))
    }

    /// Stories keep the tag name they were written with.
    #[instrument(skip(self))]
    pub async fn delete(&self, actor_id: Snowflake, tag_id: Snowflake) -> ServiceResult<()> {
        RoleService::new(self.ctx).require_admin(actor_id).await?;

        self.ctx.mood_tag_repo().delete(tag_id).await?;

        info!(tag_id = %tag_id, "Mood tag deleted");
        self.publish(DomainEvent::MoodTagDeleted { tag_id }).await;

        Ok(())
    }

    async fn publish(&self, event: DomainEvent) {
        self.ctx.publisher().publish_event(&event).await.ok();
    }
}
