//! Role assignment - a user holding a named role

use chrono::{DateTime, Utc};

use crate::value_objects::{RoleName, Snowflake};

/// `(user, role)` pair. A user may hold several roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRole {
    pub user_id: Snowflake,
    pub role: RoleName,
    pub granted_by: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
}

impl UserRole {
    pub fn new(user_id: Snowflake, role: RoleName, granted_by: Option<Snowflake>) -> Self {
        Self {
            user_id,
            role,
            granted_by,
            created_at: Utc::now(),
        }
    }
}

/// True when any of `roles` grants admin rights.
pub fn has_admin(roles: &[UserRole]) -> bool {
    roles.iter().any(|r| r.role.is_admin())
}

/// True when any of `roles` grants moderation rights.
pub fn can_moderate(roles: &[UserRole]) -> bool {
    roles.iter().any(|r| r.role.can_moderate())
}
