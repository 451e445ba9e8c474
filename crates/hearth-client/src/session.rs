//! Explicit session passed to every view

use hearth_core::Snowflake;

/// Signed-in user and the bearer token for remote calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Snowflake,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl Principal {
    pub fn new(user_id: Snowflake, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            access_token: access_token.into(),
            refresh_token: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    SignedIn(Principal),
}

impl Session {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::SignedIn(principal) => Some(principal),
            Self::Anonymous => None,
        }
    }

    pub fn user_id(&self) -> Option<Snowflake> {
        self.principal().map(|p| p.user_id)
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }
}

impl From<Principal> for Session {
    fn from(principal: Principal) -> Self {
        Self::SignedIn(principal)
    }
}
