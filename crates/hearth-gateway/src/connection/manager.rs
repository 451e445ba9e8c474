//! Connection manager
//!
//! Tracks live connections and, per topic, the sessions listening to it.
//! The size of a topic's session set is its reference count: the first
//! subscriber opens the Redis subscription and the last one closes it.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hearth_core::ChangeTopic;
use tokio::sync::mpsc;

use super::Connection;
use crate::protocol::GatewayMessage;

/// Result of adding a session to a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// First listener on the gateway; the upstream subscription must open.
    FirstListener,
    /// Others already listen.
    Joined,
    /// This session already held the topic.
    AlreadySubscribed,
    /// Session is over its subscription limit.
    LimitReached,
    UnknownSession,
}

pub struct ConnectionManager {
    connections: DashMap<String, Arc<Connection>>,
    topic_sessions: DashMap<ChangeTopic, HashSet<String>>,
    max_subscriptions: usize,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(max_subscriptions: usize) -> Self {
        Self {
            connections: DashMap::new(),
            topic_sessions: DashMap::new(),
            max_subscriptions,
        }
    }

    #[must_use]
    pub fn new_shared(max_subscriptions: usize) -> Arc<Self> {
        Arc::new(Self::new(max_subscriptions))
    }

    pub fn add_connection(
        &self,
        session_id: String,
        sender: mpsc::Sender<GatewayMessage>,
    ) -> Arc<Connection> {
        let connection = Connection::new(session_id.clone(), sender);
        self.connections.insert(session_id.clone(), connection.clone());
        tracing::debug!(session_id = %session_id, "Connection added");
        connection
    }

    /// Drops the connection and returns the topics nobody listens to anymore.
    pub async fn remove_connection(&self, session_id: &str) -> Vec<ChangeTopic> {
        let Some((_, connection)) = self.connections.remove(session_id) else {
            return Vec::new();
        };

        let mut orphaned = Vec::new();
        for topic in connection.topics().await {
            if self.release(&topic, session_id) {
                orphaned.push(topic);
            }
        }

        tracing::debug!(
            session_id = %session_id,
            orphaned = orphaned.len(),
            "Connection removed"
        );
        orphaned
    }

    pub fn get_connection(&self, session_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(session_id).map(|r| r.clone())
    }

    pub async fn subscribe(&self, session_id: &str, topic: &ChangeTopic) -> SubscribeOutcome {
        let Some(connection) = self.get_connection(session_id) else {
            return SubscribeOutcome::UnknownSession;
        };

        if connection.is_subscribed_to(topic).await {
            return SubscribeOutcome::AlreadySubscribed;
        }
        if connection.topic_count().await >= self.max_subscriptions {
            return SubscribeOutcome::LimitReached;
        }

        connection.add_topic(topic.clone()).await;

        let first = match self.topic_sessions.entry(topic.clone()) {
            Entry::Occupied(mut sessions) => {
                sessions.get_mut().insert(session_id.to_string());
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(HashSet::from([session_id.to_string()]));
                true
            }
        };

        tracing::trace!(session_id = %session_id, topic = %topic, first, "Subscribed");

        if first {
            SubscribeOutcome::FirstListener
        } else {
            SubscribeOutcome::Joined
        }
    }

    /// Returns `true` when this was the last listener of the topic.
    pub async fn unsubscribe(&self, session_id: &str, topic: &ChangeTopic) -> bool {
        let Some(connection) = self.get_connection(session_id) else {
            return false;
        };
        if !connection.remove_topic(topic).await {
            return false;
        }
        self.release(topic, session_id)
    }

    fn release(&self, topic: &ChangeTopic, session_id: &str) -> bool {
        match self.topic_sessions.entry(topic.clone()) {
            Entry::Occupied(mut sessions) => {
                sessions.get_mut().remove(session_id);
                if sessions.get().is_empty() {
                    sessions.remove();
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(_) => false,
        }
    }

    pub fn topic_connections(&self, topic: &ChangeTopic) -> Vec<Arc<Connection>> {
        self.topic_sessions
            .get(topic)
            .map(|sessions| {
                sessions
                    .iter()
                    .filter_map(|sid| self.connections.get(sid).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Fan a frame out to every listener of `topic`. Slow consumers whose
    /// buffer is full miss the frame.
    pub fn send_to_topic(&self, topic: &ChangeTopic, message: &GatewayMessage) -> usize {
        let mut sent = 0;
        for conn in self.topic_connections(topic) {
            match conn.try_send(message.clone()) {
                Ok(()) => sent += 1,
                Err(e) => tracing::debug!(
                    session_id = %conn.session_id(),
                    error = %e,
                    "Dropped change frame"
                ),
            }
        }
        sent
    }

    pub fn listener_count(&self, topic: &ChangeTopic) -> usize {
        self.topic_sessions.get(topic).map_or(0, |s| s.len())
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn topic_count(&self) -> usize {
        self.topic_sessions.len()
    }

    pub fn has_session(&self, session_id: &str) -> bool {
        self.connections.contains_key(session_id)
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("topics", &self.topic_sessions.len())
            .field("max_subscriptions", &self.max_subscriptions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{Snowflake, WatchedTable};

    fn topic(story: i64) -> ChangeTopic {
        ChangeTopic::story_reactions(Snowflake::new(story))
    }

    #[tokio::test]
    async fn first_and_last_listener_are_reported() {
        let manager = ConnectionManager::new(10);
        let (tx1, _rx1) = mpsc::channel(4);
        let (tx2, _rx2) = mpsc::channel(4);
        manager.add_connection("a".to_string(), tx1);
        manager.add_connection("b".to_string(), tx2);

        assert_eq!(manager.subscribe("a", &topic(1)).await, SubscribeOutcome::FirstListener);
        assert_eq!(manager.subscribe("b", &topic(1)).await, SubscribeOutcome::Joined);
        assert_eq!(
            manager.subscribe("b", &topic(1)).await,
            SubscribeOutcome::AlreadySubscribed
        );
        assert_eq!(manager.listener_count(&topic(1)), 2);

        assert!(!manager.unsubscribe("a", &topic(1)).await);
        assert!(manager.unsubscribe("b", &topic(1)).await);
        assert_eq!(manager.topic_count(), 0);
        assert!(!manager.unsubscribe("b", &topic(1)).await);
    }

    #[tokio::test]
    async fn removing_connection_orphans_its_topics() {
        let manager = ConnectionManager::new(10);
        let (tx1, _rx1) = mpsc::channel(4);
        let (tx2, _rx2) = mpsc::channel(4);
        manager.add_connection("a".to_string(), tx1);
        manager.add_connection("b".to_string(), tx2);

        let stories = ChangeTopic::table(WatchedTable::Stories);
        manager.subscribe("a", &topic(1)).await;
        manager.subscribe("a", &stories).await;
        manager.subscribe("b", &stories).await;

        let orphaned = manager.remove_connection("a").await;
        assert_eq!(orphaned, vec![topic(1)]);
        assert_eq!(manager.listener_count(&stories), 1);
        assert!(!manager.has_session("a"));
        assert!(manager.remove_connection("a").await.is_empty());
    }

    #[tokio::test]
    async fn enforces_subscription_limit() {
        let manager = ConnectionManager::new(1);
        let (tx, _rx) = mpsc::channel(4);
        manager.add_connection("a".to_string(), tx);

        assert_eq!(manager.subscribe("a", &topic(1)).await, SubscribeOutcome::FirstListener);
        assert_eq!(manager.subscribe("a", &topic(2)).await, SubscribeOutcome::LimitReached);
        assert_eq!(
            manager.subscribe("missing", &topic(2)).await,
            SubscribeOutcome::UnknownSession
        );
    }

    #[tokio::test]
    async fn fans_out_only_to_listeners() {
        let manager = ConnectionManager::new(10);
        let (tx1, mut rx1) = mpsc::channel(4);
        let (tx2, mut rx2) = mpsc::channel(4);
        manager.add_connection("a".to_string(), tx1);
        manager.add_connection("b".to_string(), tx2);
        manager.subscribe("a", &topic(1)).await;

        let sent = manager.send_to_topic(&topic(1), &GatewayMessage::heartbeat_ack());
        assert_eq!(sent, 1);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
    }
}
