use formtree_core::{schema::Validator, value::Value};
use serde::{Deserialize, Serialize};

fn item_count(value: &Value) -> Result<usize, String> {
    value
        .as_array()
        .map(Vec::len)
        .ok_or_else(|| "value must be a list".to_string())
}

///
/// MinItems
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MinItems {
    target: usize,
}

impl MinItems {
    #[must_use]
    pub const fn new(target: usize) -> Self {
        Self { target }
    }
}

impl Validator for MinItems {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let count = item_count(value)?;

        if count < self.target {
            Err(format!("add at least {} (currently {count})", self.target))
        } else {
            Ok(())
        }
    }
}

///
/// MaxItems
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MaxItems {
    target: usize,
}

impl MaxItems {
    #[must_use]
    pub const fn new(target: usize) -> Self {
        Self { target }
    }
}

impl Validator for MaxItems {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let count = item_count(value)?;

        if count > self.target {
            Err(format!("at most {} allowed (currently {count})", self.target))
        } else {
            Ok(())
        }
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
        schema::{ArraySchema, ObjectSchema, SchemaSource},
        validate::validate,
    };
    use serde_json::json;

    #[test]
    fn bounds_on_list_length() {
        let rows = json!([{ "client_id": "a" }, { "client_id": "b" }]);

        assert!(MinItems::new(2).validate(&rows).is_ok());
        assert!(MinItems::new(3).validate(&rows).is_err());
        assert!(MaxItems::new(2).validate(&rows).is_ok());
        assert_eq!(
            MaxItems::new(1).validate(&rows),
            Err("at most 1 allowed (currently 2)".to_string())
        );
    }

    #[test]
    fn non_lists_are_rejected() {
        assert!(MinItems::new(1).validate(&json!("a")).is_err());
    }

    #[test]
    fn min_items_rejects_a_list_with_no_rows() {
        let schema: SchemaSource = ObjectSchema::new()
            .field(
                "supplies",
                ArraySchema::new(ObjectSchema::new()).validation(MinItems::new(2)),
            )
            .into();
        let config = EngineConfig::default();

        let empty = validate(&json!({ "supplies": [] }), &schema, &config).expect("sound");
        assert_eq!(
            empty.errors().and_then(|e| e.message("supplies")),
            Some("add at least 2 (currently 0)")
        );

        let absent = validate(&json!({}), &schema, &config).expect("sound");
        assert!(!absent.is_valid());
    }
}
