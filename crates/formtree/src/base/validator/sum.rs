use formtree_core::{schema::Validator, value::Value};
use serde::{Deserialize, Serialize};

const TOLERANCE: f64 = 1e-9;

///
/// SumEquals
///
/// Object rule for derived totals: the named parts must add up to the total
/// field. Missing parts count as zero; a missing total is not checked.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SumEquals {
    parts: Vec<String>,
    total: String,
    message: Option<String>,
}

impl SumEquals {
    #[must_use]
    pub fn new<I, S>(parts: I, total: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
            total: total.into(),
            message: None,
        }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// As a closure for `ObjectSchema::validate_with`.
    #[must_use]
    pub fn rule(self) -> impl Fn(&Value) -> Option<String> + Send + Sync + 'static {
        move |value: &Value| self.validate(value).err()
    }
}

impl Validator for SumEquals {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let Some(total) = value.get(&self.total).and_then(Value::as_f64) else {
            return Ok(());
        };
        let sum: f64 = self
            .parts
            .iter()
            .filter_map(|part| value.get(part).and_then(Value::as_f64))
            .sum();

        if (sum - total).abs() <= TOLERANCE {
            return Ok(());
        }

        Err(self.message.clone().unwrap_or_else(|| {
            format!(
                "{} ({total}) must equal the sum of {} ({sum})",
                self.total,
                self.parts.join(" + ")
            )
        }))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use formtree_core::{
        config::EngineConfig,
        schema::{FieldSchema, ObjectSchema, SchemaSource},
        validate::validate,
    };
    use serde_json::json;

    fn people() -> SumEquals {
        SumEquals::new(["men", "women", "children"], "total")
    }

    #[test]
    fn matching_parts_pass() {
        assert!(
            people()
                .validate(&json!({ "men": 2, "women": 3, "children": 5, "total": 10 }))
                .is_ok()
        );
    }

    #[test]
    fn missing_total_is_not_checked() {
        assert!(people().validate(&json!({ "men": 2 })).is_ok());
    }

    #[test]
    fn mismatch_reports_on_the_object() {
        let schema: SchemaSource = ObjectSchema::new()
            .field("men", FieldSchema::new())
            .field("women", FieldSchema::new())
            .field("children", FieldSchema::new())
            .field("total", FieldSchema::new())
            .validate_with(people().message("Total does not add up").rule())
            .into();

        let result = validate(
            &json!({ "men": 2, "women": 3, "total": 4 }),
            &schema,
            &EngineConfig::default(),
        )
        .expect("sound");

        assert_eq!(
            result.errors().and_then(|e| e.internal.as_deref()),
            Some("Total does not add up")
        );
    }

    #[test]
    fn default_message_names_fields() {
        assert_eq!(
            people().validate(&json!({ "men": 1, "total": 2 })),
            Err("total (2) must equal the sum of men + women + children (1)".to_string())
        );
    }
}
