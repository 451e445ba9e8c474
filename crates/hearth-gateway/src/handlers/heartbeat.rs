//! Heartbeat handler (op 1)

use std::sync::Arc;

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::GatewayMessage;

pub struct HeartbeatHandler;

impl HeartbeatHandler {
    pub async fn handle(connection: &Arc<Connection>) -> HandlerResult<()> {
        connection.record_heartbeat().await;
        tracing::trace!(session_id = %connection.session_id(), "Heartbeat received");

        connection
            .send(GatewayMessage::heartbeat_ack())
            .await
            .map_err(|_| HandlerError::ConnectionClosed)
    }
}
