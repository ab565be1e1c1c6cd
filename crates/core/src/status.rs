//! Status values and ordered status lists.
//!
//! A [`StatusList`] is an ordered set of [`Status`] values scoped to one
//! target entity type (e.g. `"Project"`). Status-bearing entities hold a
//! shared reference to a list and point at one of its members.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{new_entity_id, EntityId, Timestamp};

/// A named, coded state value. Two statuses are equal when both name and
/// code are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "StatusFields")]
pub struct Status {
    name: String,
    code: String,
}

/// Wire shape of a [`Status`]; decoded values go through [`Status::new`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StatusFields {
    name: String,
    code: String,
}

impl TryFrom<StatusFields> for Status {
    type Error = CoreError;

    fn try_from(fields: StatusFields) -> Result<Self, Self::Error> {
        Status::new(fields.name, fields.code)
    }
}

impl Status {
    /// Create a status. Both `name` and `code` must be non-blank.
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        let code = code.into();
        if name.trim().is_empty() {
            return Err(CoreError::Value("Status.name cannot be empty".to_string()));
        }
        if code.trim().is_empty() {
            return Err(CoreError::Value("Status.code cannot be empty".to_string()));
        }
        Ok(Self { name, code })
    }

    /// Display label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short symbolic identifier.
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// An ordered, non-empty sequence of unique statuses valid for one entity
/// type.
///
/// Lists are entities: equality is by `id`, so two lists holding the same
/// statuses are still distinct.
#[derive(Debug, Clone, Serialize)]
pub struct StatusList {
    id: EntityId,
    name: String,
    statuses: Vec<Status>,
    target_entity_type: String,
    created_at: Timestamp,
}

impl StatusList {
    /// Create a new list with a fresh identity.
    ///
    /// Fails with a value error when `statuses` is empty or repeats a code,
    /// and with a type error when `target_entity_type` is blank.
    pub fn new(
        name: impl Into<String>,
        statuses: Vec<Status>,
        target_entity_type: impl Into<String>,
    ) -> Result<Self, CoreError> {
        Self::with_identity(
            new_entity_id(),
            name,
            statuses,
            target_entity_type,
            Utc::now(),
        )
    }

    /// Rebuild a list with a known identity, e.g. when loading it from
    /// storage. Runs the same checks as [`StatusList::new`].
    pub fn with_identity(
        id: EntityId,
        name: impl Into<String>,
        statuses: Vec<Status>,
        target_entity_type: impl Into<String>,
        created_at: Timestamp,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        let target_entity_type = target_entity_type.into();

        if target_entity_type.trim().is_empty() {
            return Err(CoreError::Type(
                "StatusList.target_entity_type should be an entity type name, not empty"
                    .to_string(),
            ));
        }
        if statuses.is_empty() {
            return Err(CoreError::Value(
                "StatusList.statuses cannot be empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(statuses.len());
        for status in &statuses {
            if !seen.insert(status.code()) {
                return Err(CoreError::Value(format!(
                    "StatusList.statuses contains duplicate code {:?}",
                    status.code()
                )));
            }
        }

        Ok(Self {
            id,
            name,
            statuses,
            target_entity_type,
            created_at,
        })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }

    pub fn target_entity_type(&self) -> &str {
        &self.target_entity_type
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Status> {
        self.statuses.get(index)
    }

    /// The default status, used when no status is requested.
    pub fn first(&self) -> &Status {
        &self.statuses[0]
    }

    /// Index of `status` in this list, if it is a member.
    pub fn position(&self, status: &Status) -> Option<usize> {
        self.statuses.iter().position(|s| s == status)
    }

    pub fn contains(&self, status: &Status) -> bool {
        self.position(status).is_some()
    }

    /// Whether this list is declared for `entity_type`.
    pub fn targets(&self, entity_type: &str) -> bool {
        self.target_entity_type == entity_type
    }
}

impl PartialEq for StatusList {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StatusList {}

impl std::ops::Index<usize> for StatusList {
    type Output = Status;

    fn index(&self, index: usize) -> &Status {
        &self.statuses[index]
    }
}
