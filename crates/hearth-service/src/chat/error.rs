use thiserror::Error;

/// Chat proxy failures. The display strings are what clients see.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chat service is not configured")]
    NotConfigured,

    #[error("Messages must be a non-empty list of user or assistant turns")]
    InvalidMessages,

    #[error("Chat service authentication failed")]
    UpstreamAuth,

    #[error("Too many requests, please try again in a moment")]
    RateLimited,

    #[error("Chat service is temporarily unavailable")]
    Upstream(String),
}

impl ChatError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotConfigured => 500,
            Self::InvalidMessages => 400,
            Self::UpstreamAuth | Self::Upstream(_) => 502,
            Self::RateLimited => 429,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "CHAT_NOT_CONFIGURED",
            Self::InvalidMessages => "INVALID_MESSAGES",
            Self::UpstreamAuth => "CHAT_UPSTREAM_AUTH",
            Self::RateLimited => "CHAT_RATE_LIMITED",
            Self::Upstream(_) => "CHAT_UNAVAILABLE",
        }
    }

    /// Maps an upstream HTTP status.
    pub fn from_upstream_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => Self::UpstreamAuth,
            429 => Self::RateLimited,
            _ => Self::Upstream(format!("status {status}: {body}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_statuses_map_to_fixed_errors() {
        let auth = ChatError::from_upstream_status(401, "");
        assert_eq!(auth.status_code(), 502);
        assert_eq!(auth.to_string(), "Chat service authentication failed");

        assert!(matches!(ChatError::from_upstream_status(403, ""), ChatError::UpstreamAuth));

        let limited = ChatError::from_upstream_status(429, "slow down");
        assert_eq!(limited.status_code(), 429);
        assert_eq!(limited.to_string(), "Too many requests, please try again in a moment");

        let other = ChatError::from_upstream_status(503, "overloaded");
        assert_eq!(other.status_code(), 502);
        assert_eq!(other.to_string(), "Chat service is temporarily unavailable");
    }
}
