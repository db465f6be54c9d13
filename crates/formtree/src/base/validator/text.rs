use super::as_text;
use formtree_core::{schema::Validator, value::Value};
use serde::{Deserialize, Serialize};

///
/// MaxLen
/// Character count, not bytes.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MaxLen {
    target: usize,
}

impl MaxLen {
    #[must_use]
    pub const fn new(target: usize) -> Self {
        Self { target }
    }
}

impl Validator for MaxLen {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let len = as_text(value)?.chars().count();

        if len > self.target {
            Err(format!(
                "length ({len}) is greater than maximum of {}",
                self.target
            ))
        } else {
            Ok(())
        }
    }
}

///
/// MinLen
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MinLen {
    target: usize,
}

impl MinLen {
    #[must_use]
    pub const fn new(target: usize) -> Self {
        Self { target }
    }
}

impl Validator for MinLen {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let len = as_text(value)?.trim().chars().count();

        if len < self.target {
            Err(format!(
                "length ({len}) is lower than minimum of {}",
                self.target
            ))
        } else {
            Ok(())
        }
    }
}

///
/// NotBlank
///
/// Only useful where blank input is not already normalized away, e.g.
/// inside list values.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct NotBlank;

impl Validator for NotBlank {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let blank = match value {
            Value::String(s) => s.trim().is_empty(),
            Value::Array(items) => items
                .iter()
                .any(|item| item.as_str().is_some_and(|s| s.trim().is_empty())),
            _ => false,
        };

        if blank {
            Err("may not be blank".to_string())
        } else {
            Ok(())
        }
    }
}

///
/// TESTS
///
