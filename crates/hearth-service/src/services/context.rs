//! Service context - dependency container for services
//!
//! Holds the repositories, cache stores and collaborators the services need.

use std::sync::Arc;

use hearth_cache::{ChangePublisher, RefreshTokenStore};
use hearth_common::auth::JwtService;
use hearth_common::FeedConfig;
use hearth_core::traits::{
    AnalyticsRepository, MoodTagRepository, ReactionRepository, RoleRepository, StoryRepository,
    UserRepository,
};
use hearth_core::{Snowflake, SnowflakeGenerator};

use crate::chat::LanguageModel;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    story_repo: Arc<dyn StoryRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    mood_tag_repo: Arc<dyn MoodTagRepository>,
    role_repo: Arc<dyn RoleRepository>,
    analytics_repo: Arc<dyn AnalyticsRepository>,

    // Cache
    refresh_token_store: RefreshTokenStore,
    publisher: ChangePublisher,

    // Collaborators
    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    language_model: Arc<dyn LanguageModel>,

    feed: FeedConfig,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::default()
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn story_repo(&self) -> &dyn StoryRepository {
        self.story_repo.as_ref()
    }

    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    pub fn mood_tag_repo(&self) -> &dyn MoodTagRepository {
        self.mood_tag_repo.as_ref()
    }

    pub fn role_repo(&self) -> &dyn RoleRepository {
        self.role_repo.as_ref()
    }

    pub fn analytics_repo(&self) -> &dyn AnalyticsRepository {
        self.analytics_repo.as_ref()
    }

    // === Cache ===

    pub fn refresh_token_store(&self) -> &RefreshTokenStore {
        &self.refresh_token_store
    }

    /// Change notices for the push gateway
    pub fn publisher(&self) -> &ChangePublisher {
        &self.publisher
    }

    // === Collaborators ===

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn language_model(&self) -> &dyn LanguageModel {
        self.language_model.as_ref()
    }

    pub fn feed_config(&self) -> &FeedConfig {
        &self.feed
    }

    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("feed", &self.feed)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ServiceContext`]
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    story_repo: Option<Arc<dyn StoryRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    mood_tag_repo: Option<Arc<dyn MoodTagRepository>>,
    role_repo: Option<Arc<dyn RoleRepository>>,
    analytics_repo: Option<Arc<dyn AnalyticsRepository>>,
    refresh_token_store: Option<RefreshTokenStore>,
    publisher: Option<ChangePublisher>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    language_model: Option<Arc<dyn LanguageModel>>,
    feed: Option<FeedConfig>,
}

impl ServiceContextBuilder {
    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn story_repo(mut self, repo: Arc<dyn StoryRepository>) -> Self {
        self.story_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn mood_tag_repo(mut self, repo: Arc<dyn MoodTagRepository>) -> Self {
        self.mood_tag_repo = Some(repo);
        self
    }

    pub fn role_repo(mut self, repo: Arc<dyn RoleRepository>) -> Self {
        self.role_repo = Some(repo);
        self
    }

    pub fn analytics_repo(mut self, repo: Arc<dyn AnalyticsRepository>) -> Self {
        self.analytics_repo = Some(repo);
        self
    }

    pub fn refresh_token_store(mut self, store: RefreshTokenStore) -> Self {
        self.refresh_token_store = Some(store);
        self
    }

    pub fn publisher(mut self, publisher: ChangePublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    pub fn feed_config(mut self, feed: FeedConfig) -> Self {
        self.feed = Some(feed);
        self
    }

    /// # Errors
    /// Returns `ServiceError::Validation` naming the first missing dependency.
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            user_repo: required(self.user_repo, "user_repo")?,
            story_repo: required(self.story_repo, "story_repo")?,
            reaction_repo: required(self.reaction_repo, "reaction_repo")?,
            mood_tag_repo: required(self.mood_tag_repo, "mood_tag_repo")?,
            role_repo: required(self.role_repo, "role_repo")?,
            analytics_repo: required(self.analytics_repo, "analytics_repo")?,
            refresh_token_store: required(self.refresh_token_store, "refresh_token_store")?,
            publisher: required(self.publisher, "publisher")?,
            jwt_service: required(self.jwt_service, "jwt_service")?,
            snowflake_generator: required(self.snowflake_generator, "snowflake_generator")?,
            language_model: required(self.language_model, "language_model")?,
            feed: required(self.feed, "feed_config")?,
        })
    }
}

fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
}
