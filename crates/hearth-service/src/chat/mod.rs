//! Language model collaborator for the chat proxy.

mod error;
mod http;

pub use error::ChatError;
pub use http::HttpLanguageModel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message of a conversation as sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Chat completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// `false` when no credential is available; no request is attempted.
    fn is_configured(&self) -> bool;

    /// Reply text for a conversation whose first turn is the system prompt.
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, ChatError>;
}
