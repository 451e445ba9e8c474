//! Role assignment model -> entity

use hearth_core::entities::UserRole;
use hearth_core::error::DomainError;
use hearth_core::value_objects::{RoleName, Snowflake};

use crate::models::UserRoleModel;

impl TryFrom<UserRoleModel> for UserRole {
    type Error = DomainError;

    fn try_from(model: UserRoleModel) -> Result<Self, Self::Error> {
        let role = RoleName::parse(&model.role)
            .map_err(|_| DomainError::DatabaseError(format!("unexpected role in row: {}", model.role)))?;
        Ok(UserRole {
            user_id: Snowflake::new(model.user_id),
            role,
            granted_by: model.granted_by.map(Snowflake::new),
            created_at: model.created_at,
        })
    }
}
