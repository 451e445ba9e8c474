//! Gateway state

use std::sync::Arc;

use hearth_common::GatewayConfig;

use crate::broadcast::ChangeDispatcher;
use crate::connection::ConnectionManager;

/// Shared dependencies for WebSocket sessions.
#[derive(Clone)]
pub struct GatewayState {
    connection_manager: Arc<ConnectionManager>,
    dispatcher: Arc<ChangeDispatcher>,
    config: Arc<GatewayConfig>,
}

impl GatewayState {
    pub fn new(
        connection_manager: Arc<ConnectionManager>,
        dispatcher: Arc<ChangeDispatcher>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            connection_manager,
            dispatcher,
            config: Arc::new(config),
        }
    }

    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.connection_manager
    }

    pub fn dispatcher(&self) -> &ChangeDispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn heartbeat_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.config.heartbeat_interval_ms)
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connection_manager", &self.connection_manager)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
