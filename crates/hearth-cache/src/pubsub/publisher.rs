//! Publishes change notices to Redis for the push gateway.

use redis::AsyncCommands;

use hearth_core::{ChangeNotice, DomainEvent};

use crate::pool::{CacheResult, RedisPool};

/// Fans a notice out to the table-wide channel and every filtered channel the
/// row matches.
#[derive(Clone)]
pub struct ChangePublisher {
    pool: RedisPool,
}

impl ChangePublisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Returns the total number of receivers across channels.
    pub async fn publish(&self, notice: &ChangeNotice) -> CacheResult<u32> {
        let payload = serde_json::to_string(notice)?;
        let mut conn = self.pool.get().await?;
        let mut receivers = 0;

        for topic in notice.topics() {
            let channel = topic.channel_name();
            let count: u32 = conn.publish(&channel, &payload).await?;
            receivers += count;
        }

        tracing::debug!(
            table = %notice.table,
            op = ?notice.op,
            receivers,
            "Published change notice"
        );

        Ok(receivers)
    }

    pub async fn publish_event(&self, event: &DomainEvent) -> CacheResult<u32> {
        self.publish(&event.to_notice()).await
    }
}
