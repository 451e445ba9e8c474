//! Role assignment database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct UserRoleModel {
    pub user_id: i64,
    pub role: String,
    pub granted_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}
