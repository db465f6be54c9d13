use crate::{
    client_id::ClientId,
    schema::{SchemaSource, Validator},
    value::Value,
};
use std::{fmt, sync::Arc};

/// Extracts the stable identity of one array element.
pub type KeySelector = Arc<dyn Fn(&Value) -> Option<ClientId> + Send + Sync>;

///
/// ArraySchema
///
/// Rules for a list-valued field. Each element is validated against
/// `member`; its errors are filed under the element's key, never its index.
///

#[derive(Clone)]
pub struct ArraySchema {
    pub member: SchemaSource,
    pub key_selector: Option<KeySelector>,
    pub required: bool,
    pub required_message: Option<String>,
    pub validations: Vec<Arc<dyn Validator>>,
    pub force_value: Option<Value>,
}

impl ArraySchema {
    pub fn new(member: impl Into<SchemaSource>) -> Self {
        Self {
            member: member.into(),
            key_selector: None,
            required: false,
            required_message: None,
            validations: Vec::new(),
            force_value: None,
        }
    }

    /// Override the default key lookup (the configured client-id field).
    #[must_use]
    pub fn key_by<F>(mut self, selector: F) -> Self
    where
        F: Fn(&Value) -> Option<ClientId> + Send + Sync + 'static,
    {
        self.key_selector = Some(Arc::new(selector));
        self
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

    /// List-level check, e.g. a minimum row count.
    #[must_use]
    pub fn validation(mut self, validator: impl Validator + 'static) -> Self {
        self.validations.push(Arc::new(validator));
        self
    }

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

    /// Key of one element, via the selector or the `key_field` fallback.
    #[must_use]
    pub fn key_of(&self, element: &Value, key_field: &str) -> Option<ClientId> {
        match &self.key_selector {
            Some(selector) => selector(element),
            None => ClientId::read(element, key_field),
        }
    }

    pub fn first_failure(&self, value: &Value) -> Option<String> {
        self.validations
            .iter()
            .find_map(|validator| validator.validate(value).err())
    }
}

impl fmt::Debug for ArraySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArraySchema")
            .field("member", &self.member)
            .field("custom_key", &self.key_selector.is_some())
            .field("required", &self.required)
            .field("validations", &self.validations.len())
            .field("force_value", &self.force_value)
            .finish_non_exhaustive()
    }
}

///
/// TESTS
///
