//! Client error types

use hearth_core::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Sign in required")]
    Unauthenticated,

    #[error("Not found")]
    NotFound,

    #[error("Request failed ({status}): {message}")]
    Status {
        status: u16,
        code: String,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("Invalid frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Push channel closed")]
    ChannelClosed,

    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<tokio_tungstenite::tungstenite::Error> for GatewayError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

impl GatewayError {
    /// Authentication failures are shown as a sign-in notice, everything
    /// else as a generic retry prompt.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Unauthenticated => true,
            Self::Status { status, .. } => *status == 401,
            _ => false,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
