use formtree_core::{schema::Validator, value::Value};
use serde::{Deserialize, Serialize};

// ============================================================================
// Helpers
// ============================================================================

/// Numeric content of a value. Number inputs may deliver numeric strings.
fn as_number(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| "number is out of range".to_string()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{s}' is not a number")),
        _ => Err("value must be a number".to_string()),
    }
}

// ============================================================================
// Comparison validators
// ============================================================================

macro_rules! cmp_validator {
    ($name:ident, $op:tt, $msg:expr) => {
        #[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
        pub struct $name {
            target: f64,
        }

        impl $name {
            #[must_use]
            pub const fn new(target: f64) -> Self {
                Self { target }
            }
        }

        impl Validator for $name {
            fn validate(&self, value: &Value) -> Result<(), String> {
                let v = as_number(value)?;
                if v $op self.target {
                    Ok(())
                } else {
                    Err(format!($msg, v, self.target))
                }
            }
        }
    };
}

cmp_validator!(Lte, <=, "{} must be <= {}");
cmp_validator!(Gte, >=, "{} must be >= {}");

// ============================================================================
// Range
// ============================================================================

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Range {
    min: f64,
    max: f64,
    #[serde(skip)]
    error: Option<String>,
}

impl Range {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self {
                min,
                max,
                error: None,
            }
        } else {
            Self {
                min: 0.0,
                max: 0.0,
                error: Some("range requires min <= max".to_string()),
            }
        }
    }
}

impl Validator for Range {
    fn validate(&self, value: &Value) -> Result<(), String> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        let v = as_number(value)?;
        if v < self.min || v > self.max {
            Err(format!("{v} must be between {} and {}", self.min, self.max))
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Integer
// ============================================================================

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Integer;

impl Validator for Integer {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let v = as_number(value)?;

        if v.fract() == 0.0 {
            Ok(())
        } else {
            Err(format!("{v} must be a whole number"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
