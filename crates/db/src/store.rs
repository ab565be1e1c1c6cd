//! PostgreSQL implementation of the core status store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use atelier_core::error::CoreError;
use atelier_core::{StatusList, StatusListStore};

use crate::models::status::{StatusListEntryRow, StatusListRow};
use crate::repositories::StatusListRepo;
use crate::DbPool;

fn storage_error(e: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("status store: {e}"))
}

/// Build the domain list from a row read by lookup. A row without members
/// was deleted between the two reads and counts as not found.
fn assemble(
    row: StatusListRow,
    entries: Vec<StatusListEntryRow>,
) -> Result<Option<Arc<StatusList>>, CoreError> {
    if entries.is_empty() {
        tracing::debug!(status_list_id = row.id, "Status list has no members, treating as absent");
        return Ok(None);
    }
    Ok(Some(Arc::new(row.into_status_list(entries)?)))
}

/// Status store backed by the `status_lists` tables.
///
/// `register` queues lists in memory; `commit` writes every queued list in
/// one transaction. A failed commit keeps the queue so the caller can retry
/// or roll back.
pub struct PgStatusListStore {
    pool: DbPool,
    pending: Mutex<Vec<Arc<StatusList>>>,
}

impl PgStatusListStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn pending(&self) -> Result<std::sync::MutexGuard<'_, Vec<Arc<StatusList>>>, CoreError> {
        self.pending
            .lock()
            .map_err(|_| CoreError::Internal("pending status lists lock poisoned".to_string()))
    }
}

#[async_trait]
impl StatusListStore for PgStatusListStore {
    async fn find_status_list_for(
        &self,
        entity_type: &str,
    ) -> Result<Option<Arc<StatusList>>, CoreError> {
        let rows = StatusListRepo::find_for_entity_type(&self.pool, entity_type)
            .await
            .map_err(storage_error)?;
        if rows.len() > 1 {
            tracing::warn!(
                entity_type,
                count = rows.len(),
                "Several status lists registered for one entity type, using the earliest"
            );
        }
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        let entries = StatusListRepo::entries(&self.pool, row.id)
            .await
            .map_err(storage_error)?;
        assemble(row, entries)
    }

    async fn register(&self, list: StatusList) -> Result<Arc<StatusList>, CoreError> {
        let list = Arc::new(list);
        let mut pending = self.pending()?;
        if pending.iter().any(|l| l.id() == list.id()) {
            return Err(CoreError::Value(format!(
                "status list {} is already registered",
                list.id()
            )));
        }
        pending.push(list.clone());
        Ok(list)
    }

    async fn commit(&self) -> Result<usize, CoreError> {
        let lists = self.pending()?.clone();
        if lists.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(storage_error)?;
        for list in &lists {
            StatusListRepo::create_in(&mut *tx, list)
                .await
                .map_err(storage_error)?;
        }
        tx.commit().await.map_err(storage_error)?;

        let mut pending = self.pending()?;
        pending.retain(|l| !lists.iter().any(|c| c.id() == l.id()));
        tracing::debug!(count = lists.len(), "Committed status lists");
        Ok(lists.len())
    }

    async fn rollback(&self) -> Result<usize, CoreError> {
        let mut pending = self.pending()?;
        let count = pending.len();
        pending.clear();
        tracing::debug!(count, "Rolled back status lists");
        Ok(count)
    }
}
