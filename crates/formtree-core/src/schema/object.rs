use crate::{
    error::SchemaError,
    path::{Path, PathSegment},
    schema::{ArraySchema, FieldSchema},
    value::Value,
};
use std::{borrow::Cow, collections::BTreeMap, fmt, sync::Arc};

/// Cross-field rule over a whole (normalized) object.
pub type ObjectValidator = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// Schema computed from the current value of the object it describes.
pub type SchemaFn = Arc<dyn Fn(&Value) -> Result<ObjectSchema, SchemaError> + Send + Sync>;

///
/// SchemaNode
///

#[derive(Clone, Debug)]
pub enum SchemaNode {
    Field(FieldSchema),
    Object(SchemaSource),
    Array(ArraySchema),
}

impl From<FieldSchema> for SchemaNode {
    fn from(field: FieldSchema) -> Self {
        Self::Field(field)
    }
}

impl From<ArraySchema> for SchemaNode {
    fn from(array: ArraySchema) -> Self {
        Self::Array(array)
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(object: ObjectSchema) -> Self {
        Self::Object(object.into())
    }
}

impl From<SchemaSource> for SchemaNode {
    fn from(source: SchemaSource) -> Self {
        Self::Object(source)
    }
}

///
/// ObjectSchema
///

#[derive(Clone, Default)]
pub struct ObjectSchema {
    fields: BTreeMap<String, SchemaNode>,
    validation: Option<ObjectValidator>,
}

impl ObjectSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        self.fields.insert(name.into(), node.into());
        self
    }

    /// Cross-field rule; its message lands on this object's `$internal` slot.
    #[must_use]
    pub fn validate_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.validation = Some(Arc::new(f));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, node: impl Into<SchemaNode>) {
        self.fields.insert(name.into(), node.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<SchemaNode> {
        self.fields.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, SchemaNode> {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    #[must_use]
    pub const fn validation(&self) -> Option<&ObjectValidator> {
        self.validation.as_ref()
    }
}

impl fmt::Debug for ObjectSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("fields", &self.fields)
            .field("validation", &self.validation.is_some())
            .finish()
    }
}

///
/// SchemaSource
///
/// Either a fixed schema or a function of the current value.
/// Dynamic sources are re-resolved on every validation pass.
///

#[derive(Clone)]
pub enum SchemaSource {
    Static(Arc<ObjectSchema>),
    Dynamic(SchemaFn),
}

impl SchemaSource {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<ObjectSchema, SchemaError> + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(f))
    }

    /// Concrete field map for this value.
    pub fn resolve(&self, value: &Value) -> Result<Cow<'_, ObjectSchema>, SchemaError> {
        match self {
            Self::Static(schema) => Ok(Cow::Borrowed(schema.as_ref())),
            Self::Dynamic(f) => f(value).map(Cow::Owned),
        }
    }
}

impl From<ObjectSchema> for SchemaSource {
    fn from(schema: ObjectSchema) -> Self {
        Self::Static(Arc::new(schema))
    }
}

impl fmt::Debug for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(schema) => f.debug_tuple("Static").field(schema).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Resolve a schema source against the current form value.
pub fn resolve_schema<'s>(
    source: &'s SchemaSource,
    value: &Value,
) -> Result<Cow<'s, ObjectSchema>, SchemaError> {
    source.resolve(value)
}

/// The array schema declared at `path`, resolving each level against the
/// value it describes. Element segments match by position or by the key the
/// array's own `key_of` yields.
pub fn array_schema_at(
    source: &SchemaSource,
    value: &Value,
    path: &Path,
    key_field: &str,
) -> Result<Option<ArraySchema>, SchemaError> {
    array_at(source, value, path.segments(), key_field)
}

fn array_at(
    source: &SchemaSource,
    value: &Value,
    segments: &[PathSegment],
    key_field: &str,
) -> Result<Option<ArraySchema>, SchemaError> {
    let Some((PathSegment::Field(name), rest)) = segments.split_first() else {
        return Ok(None);
    };
    let current = if value.is_object() { value } else { &Value::Null };
    let schema = source.resolve(current)?;
    let child = current.get(name).unwrap_or(&Value::Null);

    match (schema.get(name), rest.split_first()) {
        (Some(SchemaNode::Array(array)), None) => Ok(Some(array.clone())),
        (Some(SchemaNode::Object(nested)), Some(_)) => array_at(nested, child, rest, key_field),
        (Some(SchemaNode::Array(array)), Some((element, rest))) => {
            let rows = child.as_array().map(Vec::as_slice).unwrap_or_default();
            let row = match element {
                PathSegment::Index(index) => rows.get(*index),
                PathSegment::Key(key) => rows
                    .iter()
                    .find(|row| array.key_of(row, key_field).as_ref() == Some(key)),
                PathSegment::Field(_) => None,
            };

            match row {
                Some(row) => array_at(&array.member, row, rest, key_field),
                None => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

///
/// TESTS
///
