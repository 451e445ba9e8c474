//! Handler error types

use hearth_cache::SubscriberError;
use thiserror::Error;

use crate::protocol::CloseCode;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Pub/sub error: {0}")]
    Subscriber(#[from] SubscriberError),

    #[error("Connection closed")]
    ConnectionClosed,
}

impl HandlerError {
    pub fn to_close_code(&self) -> CloseCode {
        match self {
            Self::InvalidPayload(_) => CloseCode::DecodeError,
            Self::Subscriber(_) | Self::ConnectionClosed => CloseCode::UnknownError,
        }
    }
}

pub type HandlerResult<T> = Result<T, HandlerError>;
