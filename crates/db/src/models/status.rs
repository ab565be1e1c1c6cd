//! Rows of the `statuses`, `status_lists` and `status_list_statuses` tables.

use atelier_core::error::CoreError;
use atelier_core::types::{DbId, Timestamp};
use atelier_core::{Status, StatusList};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `statuses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusRow {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub created_at: Timestamp,
}

impl StatusRow {
    pub fn to_status(&self) -> Result<Status, CoreError> {
        Status::new(&self.name, &self.code)
    }
}

/// A row from the `status_lists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusListRow {
    pub id: DbId,
    pub uid: Uuid,
    pub name: String,
    pub target_entity_type: String,
    pub created_at: Timestamp,
}

/// One member of a status list, joined with its status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusListEntryRow {
    pub status_list_id: DbId,
    pub position: i32,
    pub status_id: DbId,
    pub name: String,
    pub code: String,
}

impl StatusListRow {
    /// Rebuild the domain list from this row and its entries, which must be
    /// ordered by `position`.
    pub fn into_status_list(self, entries: Vec<StatusListEntryRow>) -> Result<StatusList, CoreError> {
        let statuses = entries
            .into_iter()
            .map(|e| Status::new(e.name, e.code))
            .collect::<Result<Vec<_>, _>>()?;
        StatusList::with_identity(
            self.uid,
            self.name,
            statuses,
            self.target_entity_type,
            self.created_at,
        )
    }
}
