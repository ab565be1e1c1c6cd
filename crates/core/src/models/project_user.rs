//! Assignment of users to projects with a role.

use std::any::type_name;

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;
use crate::models::auth::{Role, User};
use crate::models::project::Project;
use crate::payload;
use crate::types::EntityId;

/// Joins a project, a user and the role the user holds in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectUser {
    pub project_id: EntityId,
    pub user: User,
    pub role: Role,
}

impl ProjectUser {
    /// Assign `user` to `project` with `role`.
    ///
    /// The assignment is visible from both sides: the returned record and
    /// `project.users()`. Assigning a user twice replaces the earlier role.
    pub fn new(project: &mut Project, user: &User, role: Role) -> Self {
        let project_user = Self {
            project_id: project.id,
            user: user.clone(),
            role,
        };
        project.attach(project_user.clone());
        tracing::debug!(
            project_id = %project.id,
            user_id = %user.id,
            role = %project_user.role.name,
            "Assigned user to project"
        );
        project_user
    }

    /// Assign with a role taken from an untyped payload value.
    pub fn from_json(project: &mut Project, user: &User, role: &Value) -> Result<Self, CoreError> {
        let role: Role = payload::decode_instance("ProjectUser.role", type_name::<Role>(), role)?;
        Ok(Self::new(project, user, role))
    }
}
