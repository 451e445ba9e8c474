//! Op code handlers

mod error;
mod heartbeat;
mod subscription;

pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;
pub use subscription::SubscriptionHandler;

use std::sync::Arc;

use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage, OpCode};
use crate::server::GatewayState;

pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Returns a close code when the connection must end.
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        if !message.op.is_client_op() {
            tracing::warn!(
                session_id = %connection.session_id(),
                op = %message.op,
                "Received server-only op code from client"
            );
            return Ok(Some(CloseCode::UnknownOpcode));
        }

        match message.op {
            OpCode::Heartbeat => HeartbeatHandler::handle(connection).await?,
            OpCode::Subscribe => SubscriptionHandler::subscribe(state, connection, &message).await?,
            OpCode::Unsubscribe => {
                SubscriptionHandler::unsubscribe(state, connection, &message).await?;
            }
            _ => return Ok(Some(CloseCode::UnknownOpcode)),
        }
        Ok(None)
    }
}
