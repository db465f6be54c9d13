use crate::value::Value;
use std::{fmt, sync::Arc};

///
/// Validator
///
/// A pure check over one field value.
/// Returns the user-facing message on failure.
///

pub trait Validator: Send + Sync {
    fn validate(&self, value: &Value) -> Result<(), String>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Option<String> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<(), String> {
        self(value).map_or(Ok(()), Err)
    }
}

///
/// FieldSchema
///
/// Rules for one leaf field, applied in this order:
/// `force_value`, `default_value`, `required`, then `validations`.
///

#[derive(Clone, Default)]
pub struct FieldSchema {
    pub required: bool,
    pub required_message: Option<String>,
    pub validations: Vec<Arc<dyn Validator>>,
    pub force_value: Option<Value>,
    pub default_value: Option<Value>,
}

impl FieldSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Field pinned to `null`; the shape used by inactive conditional branches.
    #[must_use]
    pub fn forced_null() -> Self {
        Self::new().force(Value::Null)
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn required_with(mut self, message: impl Into<String>) -> Self {
        self.required = true;
        self.required_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn validation(mut self, validator: impl Validator + 'static) -> Self {
        self.validations.push(Arc::new(validator));
        self
    }

    /// Closure form of [`Self::validation`].
    #[must_use]
    pub fn check<F>(self, f: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.validation(f)
    }

    #[must_use]
    pub fn force(mut self, value: impl Into<Value>) -> Self {
        self.force_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Run the validations in order; the first failure wins.
    pub fn first_failure(&self, value: &Value) -> Option<String> {
        self.validations
            .iter()
            .find_map(|validator| validator.validate(value).err())
    }
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("required", &self.required)
            .field("required_message", &self.required_message)
            .field("validations", &self.validations.len())
            .field("force_value", &self.force_value)
            .field("default_value", &self.default_value)
            .finish()
    }
}

///
/// TESTS
///
