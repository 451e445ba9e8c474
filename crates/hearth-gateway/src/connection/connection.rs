//! A single push channel connection

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hearth_core::ChangeTopic;
use tokio::sync::{mpsc, RwLock};

use crate::protocol::GatewayMessage;

pub struct Connection {
    session_id: String,
    sender: mpsc::Sender<GatewayMessage>,
    last_heartbeat: RwLock<Instant>,
    topics: RwLock<HashSet<ChangeTopic>>,
    created_at: Instant,
}

impl Connection {
    pub fn new(session_id: String, sender: mpsc::Sender<GatewayMessage>) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            sender,
            last_heartbeat: RwLock::new(Instant::now()),
            topics: RwLock::new(HashSet::new()),
            created_at: Instant::now(),
        })
    }

    /// Fresh opaque session id.
    #[must_use]
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn record_heartbeat(&self) {
        *self.last_heartbeat.write().await = Instant::now();
    }

    pub async fn time_since_heartbeat(&self) -> Duration {
        self.last_heartbeat.read().await.elapsed()
    }

    /// Returns `false` when the topic was already held.
    pub(crate) async fn add_topic(&self, topic: ChangeTopic) -> bool {
        self.topics.write().await.insert(topic)
    }

    /// Returns `false` when the topic was not held.
    pub(crate) async fn remove_topic(&self, topic: &ChangeTopic) -> bool {
        self.topics.write().await.remove(topic)
    }

    pub async fn topics(&self) -> Vec<ChangeTopic> {
        self.topics.read().await.iter().cloned().collect()
    }

    pub async fn topic_count(&self) -> usize {
        self.topics.read().await.len()
    }

    pub async fn is_subscribed_to(&self, topic: &ChangeTopic) -> bool {
        self.topics.read().await.contains(topic)
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub async fn send(
        &self,
        message: GatewayMessage,
    ) -> Result<(), mpsc::error::SendError<GatewayMessage>> {
        self.sender.send(message).await
    }

    /// Non-blocking send used for fan-out; a full buffer drops the frame.
    pub fn try_send(
        &self,
        message: GatewayMessage,
    ) -> Result<(), mpsc::error::TrySendError<GatewayMessage>> {
        self.sender.try_send(message)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{Snowflake, WatchedTable};

    #[tokio::test]
    async fn tracks_topics_without_duplicates() {
        let (tx, _rx) = mpsc::channel(4);
        let conn = Connection::new("s1".to_string(), tx);
        let topic = ChangeTopic::story_reactions(Snowflake::new(1));

        assert!(conn.add_topic(topic.clone()).await);
        assert!(!conn.add_topic(topic.clone()).await);
        assert!(conn.add_topic(ChangeTopic::table(WatchedTable::Stories)).await);
        assert_eq!(conn.topic_count().await, 2);

        assert!(conn.remove_topic(&topic).await);
        assert!(!conn.remove_topic(&topic).await);
        assert!(!conn.is_subscribed_to(&topic).await);
    }

    #[tokio::test]
    async fn heartbeat_resets_idle_time() {
        let (tx, _rx) = mpsc::channel(4);
        let conn = Connection::new(Connection::generate_id(), tx);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(conn.time_since_heartbeat().await >= Duration::from_millis(20));

        conn.record_heartbeat().await;
        assert!(conn.time_since_heartbeat().await < Duration::from_millis(20));
    }

    #[tokio::test]
    async fn closed_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(4);
        let conn = Connection::new("s1".to_string(), tx);
        assert!(!conn.is_closed());
        drop(rx);
        assert!(conn.is_closed());
        assert!(conn.try_send(GatewayMessage::heartbeat_ack()).is_err());
    }
}
