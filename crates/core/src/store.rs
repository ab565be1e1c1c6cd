//! The persisted-entity store seam used by status-bearing entities.
//!
//! Construction of an entity without an explicit status list looks the list
//! up through [`StatusListStore`]. Lists are added through a unit of work:
//! `register` queues, `commit` publishes, `rollback` discards. Lookups only
//! see committed lists.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::CoreError;
use crate::status::StatusList;

/// Lookup and registration of status lists.
#[async_trait]
pub trait StatusListStore: Send + Sync {
    /// The status list registered for `entity_type`, if any.
    async fn find_status_list_for(
        &self,
        entity_type: &str,
    ) -> Result<Option<Arc<StatusList>>, CoreError>;

    /// Add a list to the pending unit of work.
    async fn register(&self, list: StatusList) -> Result<Arc<StatusList>, CoreError>;

    /// Persist all pending lists. Returns how many were committed.
    async fn commit(&self) -> Result<usize, CoreError>;

    /// Drop all pending lists. Returns how many were discarded.
    async fn rollback(&self) -> Result<usize, CoreError>;
}

/// Pick the list to adopt among all committed lists for one entity type:
/// the earliest created. Several candidates are logged as a warning.
pub fn pick_registered<'a, I>(entity_type: &str, candidates: I) -> Option<&'a Arc<StatusList>>
where
    I: IntoIterator<Item = &'a Arc<StatusList>>,
{
    let mut matching: Vec<&Arc<StatusList>> = candidates
        .into_iter()
        .filter(|l| l.targets(entity_type))
        .collect();
    if matching.len() > 1 {
        tracing::warn!(
            entity_type,
            count = matching.len(),
            "Several status lists registered for one entity type, using the earliest"
        );
    }
    matching.sort_by_key(|l| (l.created_at(), l.id()));
    matching.into_iter().next()
}

#[derive(Debug, Default)]
struct Lists {
    committed: Vec<Arc<StatusList>>,
    pending: Vec<Arc<StatusList>>,
}

/// Process-local store, used in tests and by callers without a database.
#[derive(Debug, Default)]
pub struct InMemoryStatusStore {
    lists: RwLock<Lists>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All committed lists, in registration order.
    pub fn committed(&self) -> Result<Vec<Arc<StatusList>>, CoreError> {
        Ok(self.read()?.committed.clone())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Lists>, CoreError> {
        self.lists
            .read()
            .map_err(|_| CoreError::Internal("status store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Lists>, CoreError> {
        self.lists
            .write()
            .map_err(|_| CoreError::Internal("status store lock poisoned".to_string()))
    }
}

#[async_trait]
impl StatusListStore for InMemoryStatusStore {
    async fn find_status_list_for(
        &self,
        entity_type: &str,
    ) -> Result<Option<Arc<StatusList>>, CoreError> {
        let lists = self.read()?;
        let found = pick_registered(entity_type, &lists.committed).cloned();
        Ok(found)
    }

    async fn register(&self, list: StatusList) -> Result<Arc<StatusList>, CoreError> {
        let list = Arc::new(list);
        let mut lists = self.write()?;
        if lists.pending.iter().chain(&lists.committed).any(|l| l.id() == list.id()) {
            return Err(CoreError::Value(format!(
                "status list {} is already registered",
                list.id()
            )));
        }
        lists.pending.push(list.clone());
        Ok(list)
    }

    async fn commit(&self) -> Result<usize, CoreError> {
        let mut lists = self.write()?;
        let pending = std::mem::take(&mut lists.pending);
        let count = pending.len();
        lists.committed.extend(pending);
        tracing::debug!(count, "Committed status lists");
        Ok(count)
    }

    async fn rollback(&self) -> Result<usize, CoreError> {
        let mut lists = self.write()?;
        let count = lists.pending.len();
        lists.pending.clear();
        tracing::debug!(count, "Rolled back status lists");
        Ok(count)
    }
}
