use crate::{
    config::EngineConfig,
    error::SchemaError,
    error_tree::ErrorObject,
    path::{Path, PathSegment},
    schema::{ArraySchema, FieldSchema, SchemaNode, SchemaSource},
    value::{self, Map, Value},
};
use tracing::trace;

///
/// ValidateVisitor
///
/// Walks schema and value together. Holds the current path and the issues
/// found so far; each node reports at most one message of its own.
///

pub struct ValidateVisitor<'c> {
    config: &'c EngineConfig,
    path: Path,
    issues: Vec<(Path, String)>,
}

impl<'c> ValidateVisitor<'c> {
    #[must_use]
    pub const fn new(config: &'c EngineConfig) -> Self {
        Self {
            config,
            path: Path::root(),
            issues: Vec::new(),
        }
    }

    /// Validate the form root, which must be an object (or empty).
    pub fn visit_root(
        &mut self,
        value: &Value,
        source: &SchemaSource,
    ) -> Result<Value, SchemaError> {
        match value {
            Value::Object(_) | Value::Null => {}
            other => {
                return Err(SchemaError::NonObjectValue {
                    path: String::new(),
                    actual: value::kind_name(other),
                });
            }
        }

        let normalized = self.visit_object(Some(value), source)?;

        Ok(Value::Object(normalized))
    }

    /// Collected issues as an error tree.
    #[must_use]
    pub fn finish(self) -> ErrorObject {
        let mut errors = ErrorObject::new();
        for (path, message) in self.issues {
            errors.insert(&path, message);
        }

        errors
    }

    fn issue(&mut self, message: impl Into<String>) {
        self.issues.push((self.path.clone(), message.into()));
    }

    fn required_message(&self, custom: Option<&String>) -> String {
        custom.map_or_else(|| self.config.messages.required.clone(), Clone::clone)
    }

    // Absent or non-object values are validated as empty objects so that
    // required children still report.
    fn visit_object(
        &mut self,
        raw: Option<&Value>,
        source: &SchemaSource,
    ) -> Result<Map<String, Value>, SchemaError> {
        let current = raw.filter(|v| v.is_object()).unwrap_or(&Value::Null);
        let schema = source
            .resolve(current)
            .map_err(|err| err.at_path(&self.path.to_string()))?;

        let mut out = Map::new();
        for (name, node) in schema.fields() {
            let child = current.get(name);

            self.path.push(PathSegment::from(name.as_str()));
            let normalized = match node {
                SchemaNode::Field(field) => self.visit_field(child, field),
                SchemaNode::Object(nested) => {
                    let map = self.visit_object(child, nested)?;
                    (!map.is_empty() || child.is_some()).then_some(Value::Object(map))
                }
                SchemaNode::Array(array) => self.visit_array(child, array)?,
            };
            self.path.pop();

            if let Some(normalized) = normalized {
                out.insert(name.clone(), normalized);
            }
        }

        if let Some(check) = schema.validation() {
            let snapshot = Value::Object(out.clone());
            if let Some(message) = check(&snapshot) {
                self.issue(message);
            }
        }

        Ok(out)
    }

    fn visit_field(&mut self, raw: Option<&Value>, field: &FieldSchema) -> Option<Value> {
        if let Some(forced) = &field.force_value {
            trace!(path = %self.path, "field forced");
            return Some(forced.clone());
        }

        let normalized = raw.cloned().map(value::normalize_blank);
        let current = if value::is_undefined(normalized.as_ref()) {
            field.default_value.clone().or(normalized)
        } else {
            normalized
        };

        if value::is_empty(current.as_ref()) {
            if field.required {
                let message = self.required_message(field.required_message.as_ref());
                self.issue(message);
            }
            return current;
        }

        if let Some(message) = current.as_ref().and_then(|v| field.first_failure(v)) {
            trace!(path = %self.path, %message, "field invalid");
            self.issue(message);
        }

        current
    }

    fn visit_array(
        &mut self,
        raw: Option<&Value>,
        array: &ArraySchema,
    ) -> Result<Option<Value>, SchemaError> {
        if let Some(forced) = &array.force_value {
            return Ok(Some(forced.clone()));
        }

        let items = raw.and_then(Value::as_array);
        if array.required && items.is_none_or(Vec::is_empty) {
            let message = self.required_message(array.required_message.as_ref());
            self.issue(message);
        } else {
            // an absent list is checked as an empty one, so row minimums hold
            let no_rows = Value::Array(Vec::new());
            let subject = raw.filter(|v| !v.is_null()).unwrap_or(&no_rows);
            if let Some(message) = array.first_failure(subject) {
                self.issue(message);
            }
        }

        let Some(items) = items else {
            return Ok(raw.map(|_| Value::Null));
        };

        let config = self.config;
        let key_field = config.keys.client_id.as_str();
        let mut out = Vec::with_capacity(items.len());
        for (index, element) in items.iter().enumerate() {
            let Some(key) = array.key_of(element, key_field) else {
                self.path.push(PathSegment::Index(index));
                let path = self.path.to_string();
                self.path.pop();

                return Err(SchemaError::MissingClientId { path });
            };

            self.path.push(PathSegment::Key(key));
            let normalized = self.visit_object(Some(element), &array.member)?;
            self.path.pop();

            out.push(Value::Object(normalized));
        }

        Ok(Some(Value::Array(out)))
    }
}
