//! Redis pub/sub subscriber feeding the push gateway.
//!
//! One dedicated connection per process. Channel membership is driven over a
//! control channel so subscribe/unsubscribe never race the message stream;
//! received notices go out on a broadcast channel.

use futures_util::StreamExt;
use redis::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, RwLock};

use hearth_core::{ChangeNotice, ChangeTopic};

#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Subscriber has shut down")]
    ChannelClosed,
}

pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// A notice together with the topic it arrived on.
#[derive(Debug, Clone)]
pub struct ReceivedNotice {
    pub topic: ChangeTopic,
    pub notice: ChangeNotice,
}

impl ReceivedNotice {
    /// `None` for foreign channels or payloads that are not notices.
    fn from_redis(channel_name: &str, payload: &str) -> Option<Self> {
        let topic = ChangeTopic::parse_channel(channel_name)?;
        match serde_json::from_str::<ChangeNotice>(payload) {
            Ok(notice) => Some(Self { topic, notice }),
            Err(e) => {
                tracing::warn!(channel = %channel_name, error = %e, "Dropping malformed notice");
                None
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub redis_url: String,
    pub broadcast_buffer: usize,
    pub reconnect_delay: Duration,
}

impl SubscriberConfig {
    #[must_use]
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            broadcast_buffer: 1024,
            reconnect_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug)]
enum SubscriberCommand {
    Subscribe(Vec<String>),
    Unsubscribe(Vec<String>),
    Shutdown,
}

/// Handle to the background listener task.
#[derive(Clone)]
pub struct Subscriber {
    subscribed: Arc<RwLock<HashSet<String>>>,
    broadcast_tx: broadcast::Sender<ReceivedNotice>,
    control_tx: mpsc::Sender<SubscriberCommand>,
}

impl Subscriber {
    /// Spawn the listener. Connection failures are retried in the background.
    #[must_use]
    pub fn spawn(config: SubscriberConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_buffer);
        let (control_tx, control_rx) = mpsc::channel(64);
        let subscribed = Arc::new(RwLock::new(HashSet::new()));

        tokio::spawn(listener_loop(
            config,
            subscribed.clone(),
            broadcast_tx.clone(),
            control_rx,
        ));

        Self {
            subscribed,
            broadcast_tx,
            control_tx,
        }
    }

    pub async fn subscribe(&self, topics: &[ChangeTopic]) -> SubscriberResult<()> {
        self.send(SubscriberCommand::Subscribe(channel_names(topics)))
            .await
    }

    pub async fn unsubscribe(&self, topics: &[ChangeTopic]) -> SubscriberResult<()> {
        self.send(SubscriberCommand::Unsubscribe(channel_names(topics)))
            .await
    }

    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<ReceivedNotice> {
        self.broadcast_tx.subscribe()
    }

    pub async fn subscribed_channels(&self) -> Vec<String> {
        self.subscribed.read().await.iter().cloned().collect()
    }

    pub async fn shutdown(&self) -> SubscriberResult<()> {
        self.send(SubscriberCommand::Shutdown).await
    }

    async fn send(&self, cmd: SubscriberCommand) -> SubscriberResult<()> {
        self.control_tx
            .send(cmd)
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }
}

fn channel_names(topics: &[ChangeTopic]) -> Vec<String> {
    topics.iter().map(ChangeTopic::channel_name).collect()
}

async fn listener_loop(
    config: SubscriberConfig,
    subscribed: Arc<RwLock<HashSet<String>>>,
    broadcast_tx: broadcast::Sender<ReceivedNotice>,
    mut control_rx: mpsc::Receiver<SubscriberCommand>,
) {
    loop {
        match run_listener(&config, &subscribed, &broadcast_tx, &mut control_rx).await {
            Ok(true) => {
                tracing::info!("Subscriber shutting down");
                break;
            }
            Ok(false) => {
                tracing::warn!("Pub/sub stream ended, reconnecting");
            }
            Err(e) => {
                tracing::error!(error = %e, "Subscriber error, reconnecting");
                tokio::time::sleep(config.reconnect_delay).await;
            }
        }
    }
}

/// Runs until the stream ends (`Ok(false)`), shutdown (`Ok(true)`) or error.
async fn run_listener(
    config: &SubscriberConfig,
    subscribed: &Arc<RwLock<HashSet<String>>>,
    broadcast_tx: &broadcast::Sender<ReceivedNotice>,
    control_rx: &mut mpsc::Receiver<SubscriberCommand>,
) -> SubscriberResult<bool> {
    let client = Client::open(config.redis_url.as_str())?;
    let mut pubsub = client.get_async_pubsub().await?;

    // Restore membership after a reconnect.
    for channel in subscribed.read().await.iter() {
        pubsub.subscribe(channel).await?;
    }

    tracing::info!("Subscriber connected to Redis");

    loop {
        let mut stream = pubsub.on_message();
        let cmd = loop {
            tokio::select! {
                msg = stream.next() => {
                    let Some(msg) = msg else {
                        return Ok(false);
                    };
                    let channel = msg.get_channel_name().to_string();
                    let payload: String = msg.get_payload().unwrap_or_default();
                    if let Some(received) = ReceivedNotice::from_redis(&channel, &payload) {
                        // No receivers is fine.
                        let _ = broadcast_tx.send(received);
                    }
                }
                cmd = control_rx.recv() => break cmd,
            }
        };
        drop(stream);

        match cmd {
            Some(SubscriberCommand::Subscribe(channels)) => {
                for channel in channels {
                    match pubsub.subscribe(&channel).await {
                        Ok(()) => {
                            tracing::debug!(channel = %channel, "Subscribed");
                            subscribed.write().await.insert(channel);
                        }
                        Err(e) => {
                            tracing::error!(channel = %channel, error = %e, "Failed to subscribe");
                        }
                    }
                }
            }
            Some(SubscriberCommand::Unsubscribe(channels)) => {
                for channel in channels {
                    if let Err(e) = pubsub.unsubscribe(&channel).await {
                        tracing::error!(channel = %channel, error = %e, "Failed to unsubscribe");
                    }
                    subscribed.write().await.remove(&channel);
                }
            }
            Some(SubscriberCommand::Shutdown) | None => return Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{ChangeOp, Snowflake, WatchedTable};

    #[test]
    fn parses_notice_on_known_channel() {
        let payload = r#"{"table":"reactions","op":"INSERT","key":{"story_id":"5"}}"#;
        let received =
            ReceivedNotice::from_redis("changes:reactions:story_id=5", payload).unwrap();
        assert_eq!(received.topic, ChangeTopic::story_reactions(Snowflake::new(5)));
        assert_eq!(received.notice.op, ChangeOp::Insert);
        assert_eq!(received.notice.table, WatchedTable::Reactions);
    }

    #[test]
    fn ignores_foreign_channels_and_bad_payloads() {
        assert!(ReceivedNotice::from_redis("guild:1", "{}").is_none());
        assert!(ReceivedNotice::from_redis("changes:stories", "not json").is_none());
    }

    #[test]
    fn config_defaults() {
        let config = SubscriberConfig::new("redis://cache:6379");
        assert_eq!(config.broadcast_buffer, 1024);
        assert_eq!(config.reconnect_delay, Duration::from_secs(1));
    }
}
