//! Change dispatcher
//!
//! Bridges Redis pub/sub and WebSocket sessions. Upstream channel membership
//! follows the connection manager's topic reference counts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hearth_cache::{ReceivedNotice, Subscriber, SubscriberConfig, SubscriberError};
use hearth_core::ChangeTopic;
use tokio::sync::{broadcast, Mutex};

use crate::connection::{ConnectionManager, SubscribeOutcome};
use crate::protocol::{ChangePayload, GatewayMessage};

pub struct ChangeDispatcher {
    connection_manager: Arc<ConnectionManager>,
    subscriber: Subscriber,
    running: AtomicBool,
    /// Serializes refcount changes with their upstream command so a
    /// last-unsubscribe and a first-subscribe cannot reach Redis reordered.
    membership: Mutex<()>,
}

impl ChangeDispatcher {
    /// Spawns the Redis listener; connection failures are retried in the
    /// background.
    pub fn new(config: SubscriberConfig, connection_manager: Arc<ConnectionManager>) -> Self {
        Self {
            connection_manager,
            subscriber: Subscriber::spawn(config),
            running: AtomicBool::new(false),
            membership: Mutex::new(()),
        }
    }

    pub async fn subscribe(
        &self,
        session_id: &str,
        topic: &ChangeTopic,
    ) -> Result<SubscribeOutcome, SubscriberError> {
        let _guard = self.membership.lock().await;
        let outcome = self.connection_manager.subscribe(session_id, topic).await;
        if outcome == SubscribeOutcome::FirstListener {
            tracing::debug!(topic = %topic, "Opening upstream subscription");
            if let Err(e) = self.subscriber.subscribe(std::slice::from_ref(topic)).await {
                self.connection_manager.unsubscribe(session_id, topic).await;
                return Err(e);
            }
        }
        Ok(outcome)
    }

    /// Unknown topics are ignored.
    pub async fn unsubscribe(
        &self,
        session_id: &str,
        topic: &ChangeTopic,
    ) -> Result<(), SubscriberError> {
        let _guard = self.membership.lock().await;
        if self.connection_manager.unsubscribe(session_id, topic).await {
            tracing::debug!(topic = %topic, "Closing upstream subscription");
            self.subscriber.unsubscribe(std::slice::from_ref(topic)).await?;
        }
        Ok(())
    }

    /// Forget a session and close upstream channels it was the last on.
    pub async fn disconnect(&self, session_id: &str) {
        let _guard = self.membership.lock().await;
        let orphaned = self.connection_manager.remove_connection(session_id).await;
        if !orphaned.is_empty() {
            if let Err(e) = self.subscriber.unsubscribe(&orphaned).await {
                tracing::warn!(error = %e, "Failed to close upstream subscriptions");
            }
        }
    }

    /// Route one upstream notice to the sessions holding its topic.
    pub fn deliver(&self, received: &ReceivedNotice) -> usize {
        let frame = GatewayMessage::change(&ChangePayload {
            topic: received.topic.clone(),
            notice: received.notice.clone(),
        });
        let sent = self.connection_manager.send_to_topic(&received.topic, &frame);
        tracing::trace!(topic = %received.topic, sent, "Change delivered");
        sent
    }

    pub fn start(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Change dispatcher is already running");
            return;
        }

        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.run().await;
        });

        tracing::info!("Change dispatcher started");
    }

    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.subscriber.shutdown().await.ok();
        tracing::info!("Change dispatcher stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub async fn upstream_channels(&self) -> Vec<String> {
        self.subscriber.subscribed_channels().await
    }

    async fn run(&self) {
        let mut receiver = self.subscriber.receiver();

        while self.running.load(Ordering::SeqCst) {
            match receiver.recv().await {
                Ok(received) => {
                    self.deliver(&received);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "Change dispatcher lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::warn!("Change dispatcher channel closed");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Change dispatcher loop ended");
    }
}

impl std::fmt::Debug for ChangeDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeDispatcher")
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
