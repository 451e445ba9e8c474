//! Frame payloads

use hearth_core::{ChangeNotice, ChangeTopic};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

impl Default for HelloPayload {
    fn default() -> Self {
        Self::with_interval(DEFAULT_HEARTBEAT_INTERVAL_MS)
    }
}

/// Body of a CHANGE frame: the notice plus the topic it was routed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePayload {
    pub topic: ChangeTopic,
    #[serde(flatten)]
    pub notice: ChangeNotice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    /// Topic of the rejected SUBSCRIBE, when it could be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<ChangeTopic>,
}

impl ErrorPayload {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            topic: None,
        }
    }

    #[must_use]
    pub fn for_topic(mut self, topic: Option<ChangeTopic>) -> Self {
        self.topic = topic;
        self
    }
}
