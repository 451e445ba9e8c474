//! # hearth-cache
//!
//! Redis layer: connection pool, change-notice pub/sub between the API and
//! the push gateway, and refresh token storage.
//!
//! ```ignore
//! use hearth_cache::{ChangePublisher, RedisPool, RedisPoolConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let publisher = ChangePublisher::new(pool.clone());
//! publisher.publish(&notice).await?;
//! ```

pub mod pool;
pub mod pubsub;
pub mod session;

pub use pool::{CacheError, CacheResult, RedisPool, RedisPoolConfig, SharedRedisPool};
pub use pubsub::{
    ChangePublisher, ReceivedNotice, Subscriber, SubscriberConfig, SubscriberError,
    SubscriberResult,
};
pub use session::{RefreshTokenData, RefreshTokenStore};
