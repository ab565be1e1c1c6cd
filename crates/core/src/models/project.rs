//! Projects: the top-level status-bearing entity.

use std::any::type_name;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::CoreError;
use crate::models::auth::{Role, User};
use crate::models::project_user::ProjectUser;
use crate::models::repository::Repository;
use crate::payload;
use crate::status::StatusList;
use crate::status_state::{StatusBearing, StatusSelector, StatusState};
use crate::store::StatusListStore;
use crate::types::{new_entity_id, EntityId, Timestamp};

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub repositories: Vec<Repository>,
    #[serde(flatten)]
    status: StatusState,
    project_users: Vec<ProjectUser>,
    pub created_at: Timestamp,
}

/// DTO for creating a project.
///
/// Without `status_list`, the list registered for `"Project"` is used.
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub code: String,
    pub description: Option<String>,
    pub repositories: Vec<Repository>,
    pub status_list: Option<Arc<StatusList>>,
    pub status: StatusSelector,
}

/// Wire shape of a project create payload.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectFields {
    name: String,
    code: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status_list: Value,
    #[serde(default)]
    status: Value,
}

impl CreateProject {
    /// Decode a create payload. `status_list` and `status` follow the same
    /// rules as the typed fields; wrong-kind values are type errors.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        let fields: ProjectFields =
            payload::decode_instance("Project", type_name::<CreateProject>(), value)?;
        let (status_list, status) =
            payload::status_inputs(Project::ENTITY_TYPE, &fields.status_list, &fields.status)?;
        Ok(Self {
            name: fields.name,
            code: fields.code,
            description: fields.description,
            repositories: Vec::new(),
            status_list,
            status,
        })
    }
}

impl Project {
    /// Create a project from an untyped payload.
    pub async fn create_from_json(
        value: &Value,
        store: &dyn StatusListStore,
    ) -> Result<Self, CoreError> {
        Self::create(CreateProject::from_json(value)?, store).await
    }

    pub async fn create(
        input: CreateProject,
        store: &dyn StatusListStore,
    ) -> Result<Self, CoreError> {
        input.validate()?;
        let status =
            StatusState::resolve(Self::entity_target(), input.status_list, input.status, store)
                .await?;
        Ok(Self {
            id: new_entity_id(),
            name: input.name,
            code: input.code,
            description: input.description,
            repositories: input.repositories,
            status,
            project_users: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Users assigned to this project, in assignment order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.project_users.iter().map(|pu| &pu.user)
    }

    pub fn project_users(&self) -> &[ProjectUser] {
        &self.project_users
    }

    pub fn has_user(&self, user_id: EntityId) -> bool {
        self.users().any(|u| u.id == user_id)
    }

    /// The role `user_id` holds in this project.
    pub fn role_of(&self, user_id: EntityId) -> Option<&Role> {
        self.project_users
            .iter()
            .find(|pu| pu.user.id == user_id)
            .map(|pu| &pu.role)
    }

    /// Record an assignment; an existing assignment of the same user is
    /// replaced.
    pub(crate) fn attach(&mut self, project_user: ProjectUser) {
        match self
            .project_users
            .iter_mut()
            .find(|pu| pu.user.id == project_user.user.id)
        {
            Some(existing) => *existing = project_user,
            None => self.project_users.push(project_user),
        }
    }

    /// Remove `user_id` from the project. Returns the removed assignment.
    pub fn remove_user(&mut self, user_id: EntityId) -> Option<ProjectUser> {
        let index = self.project_users.iter().position(|pu| pu.user.id == user_id)?;
        Some(self.project_users.remove(index))
    }
}

impl StatusBearing for Project {
    const ENTITY_TYPE: &'static str = "Project";

    fn status_state(&self) -> &StatusState {
        &self.status
    }

    fn status_state_mut(&mut self) -> &mut StatusState {
        &mut self.status
    }
}
