//! Assets: status-bearing production items that belong to a project.

use std::any::type_name;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::CoreError;
use crate::models::project::Project;
use crate::payload;
use crate::status::StatusList;
use crate::status_state::{StatusBearing, StatusSelector, StatusState};
use crate::store::StatusListStore;
use crate::types::{new_entity_id, EntityId, Timestamp};

#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    pub id: EntityId,
    pub project_id: EntityId,
    pub name: String,
    pub code: String,
    #[serde(flatten)]
    status: StatusState,
    pub created_at: Timestamp,
}

/// DTO for creating an asset.
///
/// Without `status_list`, the list registered for `"Asset"` is used.
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateAsset {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub code: String,
    pub status_list: Option<Arc<StatusList>>,
    pub status: StatusSelector,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AssetFields {
    name: String,
    code: String,
    #[serde(default)]
    status_list: Value,
    #[serde(default)]
    status: Value,
}

impl CreateAsset {
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        let fields: AssetFields =
            payload::decode_instance("Asset", type_name::<CreateAsset>(), value)?;
        let (status_list, status) =
            payload::status_inputs(Asset::ENTITY_TYPE, &fields.status_list, &fields.status)?;
        Ok(Self {
            name: fields.name,
            code: fields.code,
            status_list,
            status,
        })
    }
}

impl Asset {
    /// Create an asset of `project` from an untyped payload.
    pub async fn create_from_json(
        project: &Project,
        value: &Value,
        store: &dyn StatusListStore,
    ) -> Result<Self, CoreError> {
        Self::create(project, CreateAsset::from_json(value)?, store).await
    }

    pub async fn create(
        project: &Project,
        input: CreateAsset,
        store: &dyn StatusListStore,
    ) -> Result<Self, CoreError> {
        input.validate()?;
        let status =
            StatusState::resolve(Self::entity_target(), input.status_list, input.status, store)
                .await?;
        Ok(Self {
            id: new_entity_id(),
            project_id: project.id,
            name: input.name,
            code: input.code,
            status,
            created_at: Utc::now(),
        })
    }
}

impl StatusBearing for Asset {
    const ENTITY_TYPE: &'static str = "Asset";

    fn status_state(&self) -> &StatusState {
        &self.status
    }

    fn status_state_mut(&mut self) -> &mut StatusState {
        &mut self.status
    }
}
