//! Subscribe (op 2) and unsubscribe (op 3) handlers
//!
//! Rejected requests are answered with an ERROR frame; the connection stays
//! open.

use std::sync::Arc;

use super::{HandlerError, HandlerResult};
use crate::connection::{Connection, SubscribeOutcome};
use crate::protocol::GatewayMessage;
use crate::server::GatewayState;

pub struct SubscriptionHandler;

impl SubscriptionHandler {
    pub async fn subscribe(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: &GatewayMessage,
    ) -> HandlerResult<()> {
        let topic = match message.as_topic() {
            Ok(topic) => topic,
            Err(e) => {
                let rejected = GatewayMessage::subscribe_error(
                    message.raw_topic(),
                    e.code(),
                    e.to_string(),
                );
                return reply(connection, rejected).await;
            }
        };

        let outcome = match state.dispatcher().subscribe(connection.session_id(), &topic).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(topic = %topic, error = %e, "Upstream subscribe failed");
                return reply(
                    connection,
                    GatewayMessage::subscribe_error(
                        Some(topic),
                        "SUBSCRIBE_FAILED",
                        "Subscription is unavailable",
                    ),
                )
                .await;
            }
        };

        match outcome {
            SubscribeOutcome::FirstListener | SubscribeOutcome::Joined => {
                tracing::debug!(session_id = %connection.session_id(), topic = %topic, "Subscribed");
                Ok(())
            }
            SubscribeOutcome::AlreadySubscribed => Ok(()),
            SubscribeOutcome::LimitReached => {
                reply(
                    connection,
                    GatewayMessage::subscribe_error(
                        Some(topic),
                        "TOO_MANY_SUBSCRIPTIONS",
                        format!(
                            "At most {} topics per connection",
                            state.config().max_subscriptions
                        ),
                    ),
                )
                .await
            }
            SubscribeOutcome::UnknownSession => Err(HandlerError::ConnectionClosed),
        }
    }

    pub async fn unsubscribe(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: &GatewayMessage,
    ) -> HandlerResult<()> {
        let topic = match message.as_topic() {
            Ok(topic) => topic,
            Err(e) => return reply(connection, GatewayMessage::error(e.code(), e.to_string())).await,
        };

        state
            .dispatcher()
            .unsubscribe(connection.session_id(), &topic)
            .await?;
        tracing::debug!(session_id = %connection.session_id(), topic = %topic, "Unsubscribed");
        Ok(())
    }
}

async fn reply(connection: &Arc<Connection>, message: GatewayMessage) -> HandlerResult<()> {
    connection
        .send(message)
        .await
        .map_err(|_| HandlerError::ConnectionClosed)
}
