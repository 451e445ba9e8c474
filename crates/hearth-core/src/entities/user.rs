//! User entity and its public projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

const MAX_DISPLAY_NAME: usize = 48;

/// Account of a registered member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What other readers may see of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: Snowflake,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl User {
    pub fn new(id: Snowflake, email: &str, display_name: &str) -> Result<Self, DomainError> {
        let now = Utc::now();
        Ok(Self {
            id,
            email: normalize_email(email)?,
            display_name: validate_display_name(display_name)?,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }

    pub fn set_display_name(&mut self, display_name: &str) -> Result<(), DomainError> {
        self.display_name = validate_display_name(display_name)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_avatar_url(&mut self, avatar_url: Option<String>) {
        self.avatar_url = avatar_url.filter(|u| !u.trim().is_empty());
        self.updated_at = Utc::now();
    }
}

/// Minimal shape check; deliverability is not our concern.
pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(DomainError::InvalidEmail),
    }
}

fn validate_display_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_DISPLAY_NAME {
        return Err(DomainError::ValidationError(format!(
            "display name must be 1-{MAX_DISPLAY_NAME} characters"
        )));
    }
    Ok(name.to_string())
}
