//! Users and roles.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{new_entity_id, EntityId, Timestamp};

/// A named role a user can hold within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoleFields")]
pub struct Role {
    pub id: EntityId,
    pub name: String,
    pub created_at: Timestamp,
}

/// Wire shape of a [`Role`]; decoded names are checked like [`Role::new`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RoleFields {
    #[serde(default = "new_entity_id")]
    id: EntityId,
    name: String,
    #[serde(default = "Utc::now")]
    created_at: Timestamp,
}

impl TryFrom<RoleFields> for Role {
    type Error = CoreError;

    fn try_from(fields: RoleFields) -> Result<Self, Self::Error> {
        Ok(Self {
            id: fields.id,
            created_at: fields.created_at,
            ..Role::new(fields.name)?
        })
    }
}

impl Role {
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::Value("Role.name cannot be empty".to_string()));
        }
        Ok(Self {
            id: new_entity_id(),
            name,
            created_at: Utc::now(),
        })
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub login: String,
    pub email: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub login: String,
    #[validate(email)]
    pub email: String,
}

impl User {
    pub fn create(input: CreateUser) -> Result<Self, CoreError> {
        input.validate()?;
        Ok(Self {
            id: new_entity_id(),
            name: input.name,
            login: input.login,
            email: input.email,
            created_at: Utc::now(),
        })
    }
}
