use crate::{
    error::SchemaError,
    path::{Path, PathSegment},
    schema::{SchemaNode, SchemaSource},
    value::{Map, Value},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

///
/// ClientId
///
/// Session-unique identity of one dynamic array element.
/// Assigned once at hydration or insertion and never rewritten.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read the id stored under `key_field` on an array element.
    #[must_use]
    pub fn read(element: &Value, key_field: &str) -> Option<Self> {
        element
            .get(key_field)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(Self::new)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<ClientId> for Value {
    fn from(id: ClientId) -> Self {
        Self::String(id.0)
    }
}

///
/// ClientIdGenerator
///

pub trait ClientIdGenerator {
    fn next_id(&mut self) -> ClientId;
}

///
/// UlidGenerator
/// Default generator used by live forms.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct UlidGenerator;

impl ClientIdGenerator for UlidGenerator {
    fn next_id(&mut self) -> ClientId {
        ClientId::generate()
    }
}

///
/// SequenceGenerator
/// Deterministic ids (`{prefix}-1`, `{prefix}-2`, ...) for fixtures and replays.
///

#[derive(Clone, Debug)]
pub struct SequenceGenerator {
    prefix: String,
    next: u64,
}

impl SequenceGenerator {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl ClientIdGenerator for SequenceGenerator {
    fn next_id(&mut self) -> ClientId {
        let id = ClientId::new(format!("{}-{}", self.prefix, self.next));
        self.next += 1;

        id
    }
}

/// Give every array element the schema declares a client id, keeping ids
/// that are already present.
///
/// Runs once at hydration; elements added later get their id from the row
/// patch that inserts them.
pub fn inject_client_ids(
    value: &mut Value,
    source: &SchemaSource,
    key_field: &str,
    ids: &mut dyn ClientIdGenerator,
) -> Result<(), SchemaError> {
    let mut path = Path::root();

    inject_object(value, source, key_field, ids, &mut path)
}

fn inject_object(
    value: &mut Value,
    source: &SchemaSource,
    key_field: &str,
    ids: &mut dyn ClientIdGenerator,
    path: &mut Path,
) -> Result<(), SchemaError> {
    let schema = source
        .resolve(value)
        .map_err(|err| err.at_path(&path.to_string()))?;

    let Value::Object(map) = value else {
        return Ok(());
    };

    for (name, node) in schema.fields() {
        let Some(child) = map.get_mut(name) else {
            continue;
        };

        path.push(PathSegment::from(name.as_str()));
        match node {
            SchemaNode::Field(_) => {}
            SchemaNode::Object(nested) => inject_object(child, nested, key_field, ids, path)?,
            SchemaNode::Array(array) => {
                if let Value::Array(items) = child {
                    for (index, item) in items.iter_mut().enumerate() {
                        let Value::Object(fields) = item else {
                            continue;
                        };
                        let has_id = fields
                            .get(key_field)
                            .and_then(Value::as_str)
                            .is_some_and(|id| !id.is_empty());
                        if !has_id {
                            fields.insert(key_field.to_string(), ids.next_id().into());
                        }

                        path.push(PathSegment::Index(index));
                        inject_object(item, &array.member, key_field, ids, path)?;
                        path.pop();
                    }
                }
            }
        }
        path.pop();
    }

    Ok(())
}

/// Remove client ids from every array element in the tree.
pub fn strip_client_ids(value: &mut Value, key_field: &str) {
    match value {
        Value::Array(items) => {
            for item in items {
                if let Value::Object(fields) = item {
                    fields.remove(key_field);
                }
                strip_client_ids(item, key_field);
            }
        }
        Value::Object(fields) => {
            for child in fields.values_mut() {
                strip_client_ids(child, key_field);
            }
        }
        _ => {}
    }
}

/// Build a new array element carrying a fresh client id.
pub fn new_row(
    mut fields: Map<String, Value>,
    key_field: &str,
    ids: &mut dyn ClientIdGenerator,
) -> Value {
    fields.insert(key_field.to_string(), ids.next_id().into());

    Value::Object(fields)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArraySchema, FieldSchema, ObjectSchema};
    use serde_json::json;

    fn schema() -> SchemaSource {
        let supply = ObjectSchema::new().field("title", FieldSchema::new().required());
        let activity = ObjectSchema::new()
            .field("client_id", FieldSchema::new())
            .field("supplies", ArraySchema::new(supply));

        ObjectSchema::new()
            .field("activities", ArraySchema::new(activity))
            .into()
    }

    #[test]
    fn inject_assigns_ids_at_every_declared_level() {
        let mut value = json!({
            "activities": [
                { "supplies": [{ "title": "tarp" }] },
                { "client_id": "kept", "supplies": [] }
            ]
        });
        let mut ids = SequenceGenerator::new("t");

        inject_client_ids(&mut value, &schema(), "client_id", &mut ids)
            .expect("injection should succeed");

        assert_eq!(value["activities"][0]["client_id"], json!("t-1"));
        assert_eq!(value["activities"][0]["supplies"][0]["client_id"], json!("t-2"));
        assert_eq!(value["activities"][1]["client_id"], json!("kept"));
    }

    #[test]
    fn inject_leaves_undeclared_arrays_alone() {
        let mut value = json!({ "tags": [{ "name": "a" }] });
        let mut ids = SequenceGenerator::new("t");

        inject_client_ids(&mut value, &schema(), "client_id", &mut ids)
            .expect("injection should succeed");

        assert!(value["tags"][0].get("client_id").is_none());
    }

    #[test]
    fn strip_removes_ids_recursively() {
        let mut value = json!({
            "activities": [{ "client_id": "a", "supplies": [{ "client_id": "b", "title": "x" }] }]
        });

        strip_client_ids(&mut value, "client_id");

        assert_eq!(
            value,
            json!({ "activities": [{ "supplies": [{ "title": "x" }] }] })
        );
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = ClientId::generate();
        let b = ClientId::generate();

        assert_ne!(a, b);
    }
}
