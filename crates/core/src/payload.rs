//! Decoding of untyped payload values (API patches, import files) into
//! domain inputs.
//!
//! Wrong-kind values are reported as type errors naming the field, the
//! expected Rust type and the JSON kind that was received.

use std::any::type_name;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::CoreError;
use crate::status::{Status, StatusList};
use crate::status_state::StatusSelector;

/// JSON kind name used in type error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "None",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode a record-typed field.
///
/// `expected` is the Rust path of the record type, usually
/// `std::any::type_name::<T>()`, used verbatim in the error message.
pub fn decode_instance<T: DeserializeOwned>(
    field: &str,
    expected: &str,
    value: &Value,
) -> Result<T, CoreError> {
    if !value.is_object() {
        return Err(CoreError::not_an_instance(field, expected, json_kind(value)));
    }
    T::deserialize(value).map_err(|e| {
        tracing::debug!(field, error = %e, "Payload object does not decode");
        CoreError::not_an_instance(field, expected, json_kind(value))
    })
}

/// Decode a status selector: `null` is the default, an integer is a list
/// position and an object is a status value.
pub fn status_selector(field: &str, value: &Value) -> Result<StatusSelector, CoreError> {
    let wrong_kind = || {
        CoreError::Type(format!(
            "{field} should be an integer index or a {} instance, not {}",
            std::any::type_name::<Status>(),
            json_kind(value)
        ))
    };

    match value {
        Value::Null => Ok(StatusSelector::Default),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(index), _) => Ok(StatusSelector::Index(index)),
            // Integers beyond i64 can never be in range.
            (None, Some(_)) => Ok(StatusSelector::Index(i64::MAX)),
            (None, None) => Err(wrong_kind()),
        },
        Value::Object(_) => Status::deserialize(value)
            .map(StatusSelector::Status)
            .map_err(|_| wrong_kind()),
        _ => Err(wrong_kind()),
    }
}

/// Decode the `status_list` and `status` fields of a create payload.
///
/// A `null` (or absent) `status_list` means "not given": the entity then
/// adopts the list registered in the store.
pub fn status_inputs(
    entity_type: &str,
    status_list: &Value,
    status: &Value,
) -> Result<(Option<Arc<StatusList>>, StatusSelector), CoreError> {
    let status_list = match status_list {
        Value::Null => None,
        value => {
            let list: StatusListPayload = decode_instance(
                &format!("{entity_type}.status_list"),
                type_name::<StatusList>(),
                value,
            )?;
            Some(Arc::new(list.into_status_list()?))
        }
    };
    let status = status_selector(&format!("{entity_type}.status"), status)?;
    Ok((status_list, status))
}

/// Wire shape of a status list carried in a payload.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusListPayload {
    pub name: String,
    pub statuses: Vec<Status>,
    pub target_entity_type: String,
}

impl StatusListPayload {
    pub fn into_status_list(self) -> Result<StatusList, CoreError> {
        StatusList::new(self.name, self.statuses, self.target_entity_type)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(json_kind(&json!(null)), "None");
        assert_eq!(json_kind(&json!(1)), "integer");
        assert_eq!(json_kind(&json!(1.5)), "float");
        assert_eq!(json_kind(&json!("x")), "string");
        assert_eq!(json_kind(&json!([])), "array");
        assert_eq!(json_kind(&json!({})), "object");
    }

    #[test]
    fn selector_from_null_and_integers() {
        assert_eq!(status_selector("X.status", &json!(null)).unwrap(), StatusSelector::Default);
        assert_eq!(status_selector("X.status", &json!(3)).unwrap(), StatusSelector::Index(3));
        assert_eq!(status_selector("X.status", &json!(-1)).unwrap(), StatusSelector::Index(-1));
        assert_eq!(
            status_selector("X.status", &json!(u64::MAX)).unwrap(),
            StatusSelector::Index(i64::MAX)
        );
    }

    #[test]
    fn selector_from_status_object() {
        let selector = status_selector("X.status", &json!({"name": "New", "code": "NEW"})).unwrap();
        assert_eq!(selector, StatusSelector::Status(Status::new("New", "NEW").unwrap()));
    }

    #[test]
    fn selector_rejects_other_kinds() {
        for value in [json!("0"), json!(1.2), json!([0]), json!(true), json!({"a": "status"})] {
            assert_matches!(
                status_selector("X.status", &value),
                Err(CoreError::Type(msg)) if msg.starts_with("X.status should be")
            );
        }
    }

    #[test]
    fn selector_rejects_blank_status_object() {
        assert_matches!(
            status_selector("X.status", &json!({"name": "", "code": "NEW"})),
            Err(CoreError::Type(_))
        );
    }

    #[test]
    fn decode_instance_reports_json_kind() {
        let err = decode_instance::<StatusListPayload>("X.status_list", "a::StatusList", &json!("a string"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "X.status_list should be a a::StatusList instance, not string"
        );
    }

    #[test]
    fn decode_instance_rejects_wrong_object_shape() {
        assert_matches!(
            decode_instance::<StatusListPayload>("X.status_list", "a::StatusList", &json!({"a": 1})),
            Err(CoreError::Type(msg)) if msg.ends_with("not object")
        );
    }

    #[test]
    fn status_inputs_treat_null_list_as_omitted() {
        let (list, status) = status_inputs("Shot", &json!(null), &json!(null)).unwrap();
        assert!(list.is_none());
        assert_eq!(status, StatusSelector::Default);
    }

    #[test]
    fn status_inputs_reject_wrong_kind_list() {
        for value in [json!(100), json!(""), json!(100.2)] {
            assert_matches!(
                status_inputs("Shot", &value, &json!(0)),
                Err(CoreError::Type(msg)) if msg.starts_with("Shot.status_list should be")
            );
        }
    }

    #[test]
    fn status_list_payload_builds_list() {
        let payload: StatusListPayload = decode_instance(
            "X.status_list",
            "a::StatusList",
            &json!({
                "name": "Shots",
                "statuses": [{"name": "New", "code": "NEW"}],
                "target_entity_type": "Shot",
            }),
        )
        .unwrap();
        let list = payload.into_status_list().unwrap();
        assert_eq!(list.target_entity_type(), "Shot");
        assert_eq!(list.len(), 1);
    }
}
