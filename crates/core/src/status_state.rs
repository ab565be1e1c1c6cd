//! The status capability shared by status-bearing entities.
//!
//! An entity embeds a [`StatusState`] and implements [`StatusBearing`] to
//! get validated `status` / `status_list` accessors. The state always points
//! at a member of its list; every failed assignment leaves it untouched.

use std::any::type_name;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::Serialize;

use crate::error::CoreError;
use crate::payload::{self, StatusListPayload};
use crate::status::{Status, StatusList};
use crate::store::StatusListStore;

// ---------------------------------------------------------------------------
// Entity target
// ---------------------------------------------------------------------------

/// The entity kind a status state belongs to, used to check that a status
/// list is declared for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityTarget {
    /// Concrete entity type name, e.g. `"Project"`.
    pub entity_type: &'static str,
    /// Broader kinds whose status lists the entity also accepts.
    pub parent_types: &'static [&'static str],
}

impl EntityTarget {
    pub const fn new(entity_type: &'static str) -> Self {
        Self {
            entity_type,
            parent_types: &[],
        }
    }

    /// Whether `list` may be attached to this kind of entity.
    pub fn accepts(&self, list: &StatusList) -> bool {
        list.targets(self.entity_type) || self.parent_types.iter().any(|p| list.targets(p))
    }

    fn field(&self, name: &str) -> String {
        format!("{}.{name}", self.entity_type)
    }
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

/// A requested status: the list default, a position in the list, or a
/// status value that must be a member of the list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusSelector {
    /// The first status of the list.
    #[default]
    Default,
    Index(i64),
    Status(Status),
}

impl From<i64> for StatusSelector {
    fn from(index: i64) -> Self {
        StatusSelector::Index(index)
    }
}

impl From<i32> for StatusSelector {
    fn from(index: i32) -> Self {
        StatusSelector::Index(i64::from(index))
    }
}

impl From<usize> for StatusSelector {
    fn from(index: usize) -> Self {
        StatusSelector::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

impl From<Status> for StatusSelector {
    fn from(status: Status) -> Self {
        StatusSelector::Status(status)
    }
}

impl From<&Status> for StatusSelector {
    fn from(status: &Status) -> Self {
        StatusSelector::Status(status.clone())
    }
}

impl<T: Into<StatusSelector>> From<Option<T>> for StatusSelector {
    fn from(value: Option<T>) -> Self {
        value.map_or(StatusSelector::Default, Into::into)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// A shared status list plus the position of the current status in it.
#[derive(Debug, Clone)]
pub struct StatusState {
    target: EntityTarget,
    status_list: Arc<StatusList>,
    index: usize,
}

impl StatusState {
    /// Build a state from an explicit list.
    pub fn new(
        target: EntityTarget,
        status_list: Arc<StatusList>,
        selector: StatusSelector,
    ) -> Result<Self, CoreError> {
        check_target(target, &status_list)?;
        let index = select(target, &status_list, &selector)?;
        Ok(Self {
            target,
            status_list,
            index,
        })
    }

    /// Build a state at construction time.
    ///
    /// Without an explicit list, the list registered in `store` for the
    /// entity's concrete type is adopted; if there is none the entity cannot
    /// be built.
    pub async fn resolve(
        target: EntityTarget,
        status_list: Option<Arc<StatusList>>,
        selector: StatusSelector,
        store: &dyn StatusListStore,
    ) -> Result<Self, CoreError> {
        let status_list = match status_list {
            Some(list) => list,
            None => {
                tracing::debug!(
                    entity_type = target.entity_type,
                    "No status list given, looking up the registered one"
                );
                store
                    .find_status_list_for(target.entity_type)
                    .await?
                    .ok_or_else(|| {
                        CoreError::Type(format!(
                            "{} should be a {} instance: none was given and none is \
                             registered for {}",
                            target.field("status_list"),
                            type_name::<StatusList>(),
                            target.entity_type
                        ))
                    })?
            }
        };
        Self::new(target, status_list, selector)
    }

    pub fn target(&self) -> EntityTarget {
        self.target
    }

    pub fn status(&self) -> &Status {
        &self.status_list[self.index]
    }

    pub fn status_index(&self) -> usize {
        self.index
    }

    pub fn status_list(&self) -> &Arc<StatusList> {
        &self.status_list
    }

    pub fn set_status(&mut self, selector: StatusSelector) -> Result<(), CoreError> {
        self.index = select(self.target, &self.status_list, &selector)?;
        Ok(())
    }

    /// Replace the status list.
    ///
    /// The current status is kept when the new list contains it (at its new
    /// position); otherwise it resets to the new list's first status.
    pub fn set_status_list(&mut self, status_list: Option<Arc<StatusList>>) -> Result<(), CoreError> {
        let Some(status_list) = status_list else {
            return Err(CoreError::not_an_instance(
                &self.target.field("status_list"),
                type_name::<StatusList>(),
                "None",
            ));
        };
        check_target(self.target, &status_list)?;

        let index = match status_list.position(self.status()) {
            Some(index) => index,
            None => {
                tracing::debug!(
                    entity_type = self.target.entity_type,
                    previous = self.status().code(),
                    status_list = status_list.name(),
                    "Current status not in replacement list, resetting to first status"
                );
                0
            }
        };
        self.status_list = status_list;
        self.index = index;
        Ok(())
    }
}

impl Serialize for StatusState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StatusState", 2)?;
        state.serialize_field("status_list_id", &self.status_list.id())?;
        state.serialize_field("status", self.status())?;
        state.end()
    }
}

fn check_target(target: EntityTarget, list: &StatusList) -> Result<(), CoreError> {
    if target.accepts(list) {
        return Ok(());
    }
    Err(CoreError::Type(format!(
        "{} is for {} entities, it cannot be used with {}",
        target.field("status_list"),
        list.target_entity_type(),
        target.entity_type
    )))
}

fn select(
    target: EntityTarget,
    list: &StatusList,
    selector: &StatusSelector,
) -> Result<usize, CoreError> {
    match selector {
        StatusSelector::Default => Ok(0),
        StatusSelector::Index(index) => usize::try_from(*index)
            .ok()
            .filter(|i| *i < list.len())
            .ok_or_else(|| {
                CoreError::Value(format!(
                    "{} should be in range [0, {}], got {index}",
                    target.field("status"),
                    list.len() - 1
                ))
            }),
        StatusSelector::Status(status) => list.position(status).ok_or_else(|| {
            CoreError::Value(format!(
                "{} {:?} is not a member of status list {:?}",
                target.field("status"),
                status.code(),
                list.name()
            ))
        }),
    }
}

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// Implemented by entities that carry a status from a status list.
pub trait StatusBearing {
    /// Concrete entity type name matched against `StatusList` targets.
    const ENTITY_TYPE: &'static str;

    /// Broader kinds whose status lists this entity also accepts.
    const PARENT_TYPES: &'static [&'static str] = &[];

    fn status_state(&self) -> &StatusState;

    fn status_state_mut(&mut self) -> &mut StatusState;

    fn entity_target() -> EntityTarget {
        EntityTarget {
            entity_type: Self::ENTITY_TYPE,
            parent_types: Self::PARENT_TYPES,
        }
    }

    fn status(&self) -> &Status {
        self.status_state().status()
    }

    fn status_list(&self) -> &Arc<StatusList> {
        self.status_state().status_list()
    }

    fn set_status(&mut self, selector: impl Into<StatusSelector>) -> Result<(), CoreError> {
        self.status_state_mut().set_status(selector.into())
    }

    fn set_status_list(&mut self, status_list: Option<Arc<StatusList>>) -> Result<(), CoreError> {
        self.status_state_mut().set_status_list(status_list)
    }

    /// Set the status from an untyped payload value.
    fn apply_status_json(&mut self, value: &serde_json::Value) -> Result<(), CoreError> {
        let field = format!("{}.status", Self::ENTITY_TYPE);
        let selector = payload::status_selector(&field, value)?;
        self.set_status(selector)
    }

    /// Replace the status list from an untyped payload value.
    fn apply_status_list_json(&mut self, value: &serde_json::Value) -> Result<(), CoreError> {
        let field = format!("{}.status_list", Self::ENTITY_TYPE);
        let list: StatusListPayload =
            payload::decode_instance(&field, type_name::<StatusList>(), value)?;
        let list = list.into_status_list()?;
        self.set_status_list(Some(Arc::new(list)))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::store::InMemoryStatusStore;

    const TARGET: EntityTarget = EntityTarget::new("StatMix");

    struct StatMix {
        state: StatusState,
    }

    impl StatusBearing for StatMix {
        const ENTITY_TYPE: &'static str = "StatMix";

        fn status_state(&self) -> &StatusState {
            &self.state
        }

        fn status_state_mut(&mut self) -> &mut StatusState {
            &mut self.state
        }
    }

    fn five_statuses() -> Vec<Status> {
        (1..=5)
            .map(|i| Status::new(format!("Status{i}"), format!("STS{i}")).unwrap())
            .collect()
    }

    fn list_for(target: &str) -> Arc<StatusList> {
        Arc::new(StatusList::new("Test Status List", five_statuses(), target).unwrap())
    }

    fn mixed() -> StatMix {
        StatMix {
            state: StatusState::new(TARGET, list_for("StatMix"), StatusSelector::Index(0)).unwrap(),
        }
    }

    // -- construction -------------------------------------------------------

    #[test]
    fn valid_index_selects_that_status() {
        let list = list_for("StatMix");
        for i in 0..list.len() {
            let state = StatusState::new(TARGET, list.clone(), i.into()).unwrap();
            assert_eq!(state.status(), &list[i]);
        }
    }

    #[test]
    fn default_selects_first_status() {
        let list = list_for("StatMix");
        let state = StatusState::new(TARGET, list.clone(), None::<i64>.into()).unwrap();
        assert_eq!(state.status(), list.first());
    }

    #[test]
    fn construction_rejects_out_of_range_index() {
        let list = list_for("StatMix");
        assert_matches!(
            StatusState::new(TARGET, list.clone(), 5.into()),
            Err(CoreError::Value(_))
        );
        assert_matches!(
            StatusState::new(TARGET, list, (-1).into()),
            Err(CoreError::Value(_))
        );
    }

    #[test]
    fn construction_rejects_list_for_other_type() {
        assert_matches!(
            StatusState::new(TARGET, list_for("Sequence"), StatusSelector::Default),
            Err(CoreError::Type(_))
        );
    }

    #[test]
    fn parent_type_lists_are_accepted() {
        const CHILD: EntityTarget = EntityTarget {
            entity_type: "Shot",
            parent_types: &["Task"],
        };
        assert!(StatusState::new(CHILD, list_for("Task"), StatusSelector::Default).is_ok());
        assert!(StatusState::new(CHILD, list_for("Asset"), StatusSelector::Default).is_err());
    }

    #[tokio::test]
    async fn omitted_list_without_registration_is_a_type_error() {
        let store = InMemoryStatusStore::new();
        let result = StatusState::resolve(TARGET, None, StatusSelector::Default, &store).await;
        assert_matches!(result, Err(CoreError::Type(msg)) if msg.contains("StatMix.status_list"));
    }

    #[tokio::test]
    async fn omitted_list_adopts_registered_one() {
        let store = InMemoryStatusStore::new();
        let registered = store
            .register(StatusList::new("Registered", five_statuses(), "StatMix").unwrap())
            .await
            .unwrap();
        store.commit().await.unwrap();

        let state = StatusState::resolve(TARGET, None, 2.into(), &store)
            .await
            .unwrap();
        assert_eq!(state.status_list(), &registered);
        assert_eq!(state.status().code(), "STS3");
    }

    // -- status assignment --------------------------------------------------

    #[test]
    fn set_status_by_index() {
        let mut obj = mixed();
        obj.set_status(1).unwrap();
        assert_eq!(obj.status(), &obj.status_list()[1]);
    }

    #[test]
    fn set_status_to_default_uses_first() {
        let mut obj = mixed();
        obj.set_status(3).unwrap();
        obj.set_status(StatusSelector::Default).unwrap();
        assert_eq!(obj.status(), obj.status_list().first());
    }

    #[test]
    fn set_status_with_member_status() {
        let mut obj = mixed();
        let sts2 = Status::new("Status2", "STS2").unwrap();
        obj.set_status(&sts2).unwrap();
        assert_eq!(obj.status(), &sts2);
        assert_eq!(obj.status_state().status_index(), 1);
    }

    #[test]
    fn set_status_too_high_keeps_previous() {
        let mut obj = mixed();
        obj.set_status(2).unwrap();
        let len = obj.status_list().len();
        assert_matches!(obj.set_status(len), Err(CoreError::Value(_)));
        assert_eq!(obj.status().code(), "STS3");
    }

    #[test]
    fn set_status_too_low_keeps_previous() {
        let mut obj = mixed();
        obj.set_status(4).unwrap();
        assert_matches!(obj.set_status(-1), Err(CoreError::Value(_)));
        assert_eq!(obj.status().code(), "STS5");
    }

    #[test]
    fn set_status_with_foreign_status_is_a_value_error() {
        let mut obj = mixed();
        let temp = Status::new("Temp", "TEMP").unwrap();
        assert_matches!(obj.set_status(temp), Err(CoreError::Value(msg)) if msg.contains("TEMP"));
        assert_eq!(obj.status().code(), "STS1");
    }

    // -- status list assignment ---------------------------------------------

    #[test]
    fn set_status_list_to_none_is_a_type_error() {
        let mut obj = mixed();
        let before = obj.status_list().clone();
        assert_matches!(obj.set_status_list(None), Err(CoreError::Type(_)));
        assert_eq!(obj.status_list(), &before);
    }

    #[test]
    fn set_status_list_for_other_type_is_a_type_error() {
        let mut obj = mixed();
        let sequence = Arc::new(
            StatusList::new(
                "Sequence Statuses",
                vec![
                    Status::new("On Hold", "OH").unwrap(),
                    Status::new("Complete", "CMPLT").unwrap(),
                ],
                "Sequence",
            )
            .unwrap(),
        );
        assert_matches!(obj.set_status_list(Some(sequence)), Err(CoreError::Type(_)));
    }

    #[test]
    fn set_suitable_status_list_replaces_it() {
        let mut obj = mixed();
        let suitable = list_for("StatMix");
        obj.set_status_list(Some(suitable.clone())).unwrap();
        assert_eq!(obj.status_list(), &suitable);
    }

    #[test]
    fn replacement_list_keeps_status_when_member() {
        let mut obj = mixed();
        obj.set_status(3).unwrap();
        let mut reordered = five_statuses();
        reordered.reverse();
        let list = Arc::new(StatusList::new("Reversed", reordered, "StatMix").unwrap());
        obj.set_status_list(Some(list)).unwrap();
        assert_eq!(obj.status().code(), "STS4");
        assert_eq!(obj.status_state().status_index(), 1);
    }

    #[test]
    fn replacement_list_resets_status_when_not_member() {
        let mut obj = mixed();
        obj.set_status(3).unwrap();
        let list = Arc::new(
            StatusList::new(
                "Other",
                vec![
                    Status::new("On Hold", "OH").unwrap(),
                    Status::new("Complete", "CMPLT").unwrap(),
                ],
                "StatMix",
            )
            .unwrap(),
        );
        obj.set_status_list(Some(list)).unwrap();
        assert_eq!(obj.status().code(), "OH");
    }

    // -- payloads -----------------------------------------------------------

    #[test]
    fn status_payload_of_wrong_kind_is_a_type_error() {
        let mut obj = mixed();
        for value in [json!("a string"), json!(1.2), json!([1]), json!({"a": "status"})] {
            assert_matches!(obj.apply_status_json(&value), Err(CoreError::Type(_)));
        }
        assert_eq!(obj.status().code(), "STS1");
    }

    #[test]
    fn status_payload_of_right_kind_is_applied() {
        let mut obj = mixed();
        obj.apply_status_json(&json!(2)).unwrap();
        assert_eq!(obj.status().code(), "STS3");
        obj.apply_status_json(&json!({"name": "Status5", "code": "STS5"}))
            .unwrap();
        assert_eq!(obj.status().code(), "STS5");
        obj.apply_status_json(&json!(null)).unwrap();
        assert_eq!(obj.status().code(), "STS1");
        assert_matches!(obj.apply_status_json(&json!(9)), Err(CoreError::Value(_)));
    }

    #[test]
    fn status_list_payload_of_wrong_kind_is_a_type_error() {
        let mut obj = mixed();
        for value in [
            json!("a string"),
            json!(1.0),
            json!(1),
            json!({"a": "statusList"}),
            json!(null),
        ] {
            assert_matches!(obj.apply_status_list_json(&value), Err(CoreError::Type(_)));
        }
    }

    #[test]
    fn status_list_payload_is_applied() {
        let mut obj = mixed();
        obj.apply_status_list_json(&json!({
            "name": "From payload",
            "statuses": [{"name": "Status1", "code": "STS1"}, {"name": "Done", "code": "DONE"}],
            "target_entity_type": "StatMix",
        }))
        .unwrap();
        assert_eq!(obj.status_list().name(), "From payload");
        assert_eq!(obj.status().code(), "STS1");
    }

    #[test]
    fn serializes_list_id_and_status() {
        let obj = mixed();
        let value = serde_json::to_value(obj.status_state()).unwrap();
        assert_eq!(value["status"]["code"], "STS1");
        assert_eq!(
            value["status_list_id"],
            json!(obj.status_list().id().to_string())
        );
    }
}
