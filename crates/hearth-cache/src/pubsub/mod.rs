//! Change notification pub/sub over Redis.

mod publisher;
mod subscriber;

pub use publisher::ChangePublisher;
pub use subscriber::{
    ReceivedNotice, Subscriber, SubscriberConfig, SubscriberError, SubscriberResult,
};
