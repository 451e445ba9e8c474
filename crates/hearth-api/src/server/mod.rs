//! Server setup and initialization
//!
//! Wires pools, repositories and the service context, then builds and runs
//! the Axum application.

use std::sync::Arc;

use axum::Router;
use hearth_cache::{ChangePublisher, RedisPool, RefreshTokenStore};
use hearth_common::{AppConfig, AppError, JwtService};
use hearth_core::SnowflakeGenerator;
use hearth_db::{
    create_pool, migrations_dir, run_migrations, PgAnalyticsRepository, PgMoodTagRepository,
    PgReactionRepository, PgRoleRepository, PgStoryRepository, PgUserRepository, PoolSettings,
};
use hearth_service::{HttpLanguageModel, ServiceContext};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::{apply_common_layers, apply_rate_limit};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the application: rate-limited API routes plus unthrottled health
/// routes, both behind the common layers.
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_rate_limit(create_router(), &config.rate_limit)?;
    let router = apply_common_layers(
        api.merge(health_routes()),
        &config.cors,
        config.app.env.is_production(),
    );
    Ok(router.with_state(state))
}

/// Connect to PostgreSQL and Redis, run migrations and build the state.
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolSettings::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool, migrations_dir())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL ready");

    let redis = RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    info!(url = %redis.url(), "Redis pool created");

    let language_model = HttpLanguageModel::new(config.chat.clone())
        .map_err(|e| AppError::Config(e.to_string()))?;
    if config.chat.api_key.is_none() {
        tracing::warn!("CHAT_API_KEY is not set; /chat will answer 500");
    }

    let refresh_ttl = u64::try_from(config.jwt.refresh_token_expiry)
        .map_err(|_| AppError::Config("JWT_REFRESH_EXPIRY must be positive".to_string()))?;

    let service_context = ServiceContext::builder()
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .story_repo(Arc::new(PgStoryRepository::new(pool.clone())))
        .reaction_repo(Arc::new(PgReactionRepository::new(pool.clone())))
        .mood_tag_repo(Arc::new(PgMoodTagRepository::new(pool.clone())))
        .role_repo(Arc::new(PgRoleRepository::new(pool.clone())))
        .analytics_repo(Arc::new(PgAnalyticsRepository::new(pool.clone())))
        .refresh_token_store(RefreshTokenStore::new(redis.clone(), refresh_ttl))
        .publisher(ChangePublisher::new(redis.clone()))
        .jwt_service(Arc::new(JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry,
        )))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.node_id)))
        .language_model(Arc::new(language_model))
        .feed_config(config.feed.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config, pool, redis))
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();
    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;
    info!("API listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::internal)?;

    info!("API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
