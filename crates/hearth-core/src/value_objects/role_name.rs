//! Role names. The vocabulary is open; a few names carry meaning.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

const MAX_ROLE_NAME_LEN: usize = 32;

/// Normalized (trimmed, lowercase) role name such as `admin` or `moderator`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    pub const ADMIN: &'static str = "admin";
    pub const MODERATOR: &'static str = "moderator";
    pub const USER: &'static str = "user";

    /// Accepts `[a-z0-9_-]{1,32}` after normalization.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let name = raw.trim().to_ascii_lowercase();
        let valid = !name.is_empty()
            && name.len() <= MAX_ROLE_NAME_LEN
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if valid {
            Ok(Self(name))
        } else {
            Err(DomainError::InvalidRoleName(raw.to_string()))
        }
    }

    pub fn admin() -> Self {
        Self(Self::ADMIN.to_string())
    }

    pub fn moderator() -> Self {
        Self(Self::MODERATOR.to_string())
    }

    pub fn user() -> Self {
        Self(Self::USER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }

    /// Moderators and admins may read the moderation and analytics views.
    pub fn can_moderate(&self) -> bool {
        self.is_admin() || self.0 == Self::MODERATOR
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoleName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let role = RoleName::parse("  Moderator ").unwrap();
        assert_eq!(role.as_str(), "moderator");
        assert!(role.can_moderate());
        assert!(!role.is_admin());
    }

    #[test]
    fn accepts_open_vocabulary() {
        let role = RoleName::parse("story_curator").unwrap();
        assert!(!role.can_moderate());
    }

    #[test]
    fn rejects_bad_names() {
        assert!(RoleName::parse("").is_err());
        assert!(RoleName::parse("has space").is_err());
        assert!(RoleName::parse(&"x".repeat(33)).is_err());
    }

    #[test]
    fn deserializes_through_validation() {
        let role: RoleName = serde_json::from_str("\"ADMIN\"").unwrap();
        assert!(role.is_admin());
        assert!(serde_json::from_str::<RoleName>("\"no way\"").is_err());
    }
}
