//! Gateway server setup

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use hearth_cache::SubscriberConfig;
use hearth_common::{AppConfig, AppError};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::broadcast::ChangeDispatcher;
use crate::connection::ConnectionManager;

pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/realtime", get(gateway_handler))
        .route("/health", get(health_check))
}

async fn health_check(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "connections": state.connection_manager().connection_count(),
        "topics": state.connection_manager().topic_count(),
    }))
}

pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the connection manager and starts the Redis change listener.
pub fn create_gateway_state(config: &AppConfig) -> GatewayState {
    let connection_manager = ConnectionManager::new_shared(config.gateway.max_subscriptions);
    let dispatcher = Arc::new(ChangeDispatcher::new(
        SubscriberConfig::new(config.redis.url.clone()),
        connection_manager.clone(),
    ));
    dispatcher.clone().start();

    GatewayState::new(connection_manager, dispatcher, config.gateway.clone())
}

pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.server.address();
    let state = create_gateway_state(&config);
    let app = create_app(state.clone());

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;
    tracing::info!("Gateway listening on ws://{addr}/realtime");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::internal)?;

    state.dispatcher().stop().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
