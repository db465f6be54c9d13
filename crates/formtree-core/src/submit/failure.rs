use crate::{
    config::EngineConfig,
    error_tree::ErrorObject,
    mapper::{ErrorMapper, KeyResolver},
    path::Path,
    value::Value,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

///
/// ServerFailure
///
/// What the REST client hands back when a mutation fails.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerFailure {
    pub value: FailureValue,
    pub debug_message: Option<String>,
}

impl ServerFailure {
    /// A failure carrying field errors.
    #[must_use]
    pub fn form_errors(form_errors: Value) -> Self {
        Self {
            value: FailureValue {
                form_errors: Some(form_errors),
                message_for_notification: None,
            },
            debug_message: None,
        }
    }

    /// A failure with no field errors, e.g. a dropped connection.
    #[must_use]
    pub fn transport(notification: impl Into<String>, debug: impl Into<String>) -> Self {
        Self {
            value: FailureValue {
                form_errors: None,
                message_for_notification: Some(notification.into()),
            },
            debug_message: Some(debug.into()),
        }
    }
}

///
/// FailureValue
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FailureValue {
    pub form_errors: Option<Value>,
    pub message_for_notification: Option<String>,
}

///
/// FailureKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    /// The payload was based on a stale `modified_at`; the user must choose.
    Conflict,
    /// Field errors, now in the error tree.
    Validation,
    /// No field errors; only a notification.
    Transport,
}

///
/// ClassifiedFailure
///

#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedFailure {
    pub kind: FailureKind,
    pub errors: ErrorObject,
    pub notification: Option<String>,
    pub debug_message: Option<String>,
}

const FALLBACK_NOTIFICATION: &str = "The request failed";

/// Sort a failure into conflict, validation, or transport, mapping any field
/// errors onto client ids. The `modified_at` entry that signals a conflict is
/// never shown inline.
#[must_use]
pub fn classify_failure(
    failure: &ServerFailure,
    mapper: &ErrorMapper,
    resolver: &dyn KeyResolver,
    config: &EngineConfig,
) -> ClassifiedFailure {
    let notification = failure.value.message_for_notification.clone();
    let debug_message = failure.debug_message.clone();

    let Some(form_errors) = failure.value.form_errors.as_ref().filter(|v| !v.is_null()) else {
        let mut errors = ErrorObject::new();
        errors.insert(
            &Path::root(),
            notification.as_deref().unwrap_or(FALLBACK_NOTIFICATION),
        );

        return ClassifiedFailure {
            kind: FailureKind::Transport,
            errors,
            notification,
            debug_message,
        };
    };

    let modified_at_key = config.keys.modified_at.as_str();
    let conflict = form_errors
        .get(modified_at_key)
        .is_some_and(|entry| mentions_code(entry, &config.conflict.obsolete_code));

    let mut remaining = form_errors.clone();
    if conflict {
        warn!(key = modified_at_key, "submission rejected as obsolete");
        if let Value::Object(map) = &mut remaining {
            map.remove(modified_at_key);
        }
    }

    let errors = mapper.transform_form_errors(&remaining, resolver);

    ClassifiedFailure {
        kind: if conflict {
            FailureKind::Conflict
        } else {
            FailureKind::Validation
        },
        errors,
        notification,
        debug_message,
    }
}

/// True if `entry` (a message or a list of messages) contains `code`.
#[must_use]
pub fn mentions_code(entry: &Value, code: &str) -> bool {
    match entry {
        Value::String(message) => message.contains(code),
        Value::Array(items) => items.iter().any(|item| mentions_code(item, code)),
        Value::Object(map) => map.values().any(|item| mentions_code(item, code)),
        _ => false,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mapper::ValueKeyResolver, test_fixtures::config};
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_payload() {
        let failure: ServerFailure = serde_json::from_value(json!({
            "value": {
                "formErrors": { "title": "Required" },
                "messageForNotification": "Could not save"
            },
            "debugMessage": "422 Unprocessable Entity"
        }))
        .expect("payload should deserialize");

        assert_eq!(failure.value.form_errors, Some(json!({ "title": "Required" })));
        assert_eq!(
            failure.value.message_for_notification.as_deref(),
            Some("Could not save")
        );
        assert_eq!(failure.debug_message.as_deref(), Some("422 Unprocessable Entity"));
    }

    #[test]
    fn obsolete_code_is_a_conflict_and_not_inline() {
        let failure = ServerFailure::form_errors(json!({
            "modified_at": ["OBSOLETE_PAYLOAD"],
            "title": "Too long"
        }));

        let out = classify_failure(
            &failure,
            &ErrorMapper::default(),
            &ValueKeyResolver::new(&Value::Null),
            &config(),
        );

        assert_eq!(out.kind, FailureKind::Conflict);
        assert!(out.errors.field("modified_at").is_none());
        assert_eq!(out.errors.message("title"), Some("Too long"));
    }

    #[test]
    fn other_modified_at_errors_stay_inline() {
        let failure = ServerFailure::form_errors(json!({ "modified_at": "Invalid date" }));

        let out = classify_failure(
            &failure,
            &ErrorMapper::default(),
            &ValueKeyResolver::new(&Value::Null),
            &config(),
        );

        assert_eq!(out.kind, FailureKind::Validation);
        assert_eq!(out.errors.message("modified_at"), Some("Invalid date"));
    }

    #[test]
    fn transport_failure_becomes_root_error() {
        let failure = ServerFailure::transport("Network unreachable", "ECONNRESET");

        let out = classify_failure(
            &failure,
            &ErrorMapper::default(),
            &ValueKeyResolver::new(&Value::Null),
            &config(),
        );

        assert_eq!(out.kind, FailureKind::Transport);
        assert_eq!(out.errors.internal.as_deref(), Some("Network unreachable"));
        assert_eq!(out.debug_message.as_deref(), Some("ECONNRESET"));
    }
}
