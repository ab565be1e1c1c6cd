/// Errors raised by domain validation and the status store seam.
///
/// `Type` and `Value` render as their bare message so callers can surface
/// them to users unchanged.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The input has the wrong shape or kind.
    #[error("{0}")]
    Type(String),

    /// The input has the right kind but an invalid value, range or membership.
    #[error("{0}")]
    Value(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Build the type error raised when a record-typed field receives
    /// something else, e.g. `ProjectUser.role should be a
    /// atelier_core::models::auth::Role instance, not string`.
    pub fn not_an_instance(field: &str, expected: &str, actual: &str) -> Self {
        CoreError::Type(format!(
            "{field} should be a {expected} instance, not {actual}"
        ))
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Value(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_and_value_errors_display_bare_message() {
        assert_eq!(CoreError::Type("bad kind".into()).to_string(), "bad kind");
        assert_eq!(CoreError::Value("bad value".into()).to_string(), "bad value");
    }

    #[test]
    fn not_an_instance_message_format() {
        let err = CoreError::not_an_instance("Asset.status_list", "a::StatusList", "float");
        assert_eq!(
            err.to_string(),
            "Asset.status_list should be a a::StatusList instance, not float"
        );
    }
}
