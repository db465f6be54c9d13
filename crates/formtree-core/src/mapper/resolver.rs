use crate::{
    client_id::ClientId,
    config::DEFAULT_CLIENT_ID_KEY,
    mapper::server::{ServerPath, ServerSegment},
    schema::{SchemaNode, SchemaSource},
    value::Value,
};

///
/// KeyResolver
///
/// Maps the indices captured from a server path to the client ids of the
/// elements that sit at those positions now. `None` means an element is gone.
///

pub trait KeyResolver {
    fn resolve(&self, path: &ServerPath, indices: &[usize]) -> Option<Vec<ClientId>>;
}

impl<F> KeyResolver for F
where
    F: Fn(&ServerPath, &[usize]) -> Option<Vec<ClientId>>,
{
    fn resolve(&self, path: &ServerPath, indices: &[usize]) -> Option<Vec<ClientId>> {
        self(path, indices)
    }
}

///
/// ValueKeyResolver
///
/// Resolves against the live form value by walking the server path.
/// Reads only the key field; arrays declared with `key_by` need
/// [`SchemaKeyResolver`].
///

#[derive(Clone, Copy, Debug)]
pub struct ValueKeyResolver<'a> {
    value: &'a Value,
    key_field: &'a str,
}

impl<'a> ValueKeyResolver<'a> {
    #[must_use]
    pub const fn new(value: &'a Value) -> Self {
        Self {
            value,
            key_field: DEFAULT_CLIENT_ID_KEY,
        }
    }

    #[must_use]
    pub const fn with_key_field(mut self, key_field: &'a str) -> Self {
        self.key_field = key_field;
        self
    }
}

impl KeyResolver for ValueKeyResolver<'_> {
    fn resolve(&self, path: &ServerPath, _indices: &[usize]) -> Option<Vec<ClientId>> {
        let mut node = self.value;
        let mut ids = Vec::new();

        for seg in path.segments() {
            node = match seg {
                ServerSegment::Field(name) => match node.get(name) {
                    Some(child) => child,
                    // trailing field segments may name values the form never held
                    None => break,
                },
                ServerSegment::Index(index) => {
                    let element = node.get(*index)?;
                    ids.push(ClientId::read(element, self.key_field)?);
                    element
                }
            };
        }

        (ids.len() == index_count(path)).then_some(ids)
    }
}

///
/// SchemaKeyResolver
///
/// Resolves through each array's own `key_of`, so server errors land on the
/// same keys local validation files them under.
///

#[derive(Clone, Copy, Debug)]
pub struct SchemaKeyResolver<'a> {
    schema: &'a SchemaSource,
    value: &'a Value,
    key_field: &'a str,
}

impl<'a> SchemaKeyResolver<'a> {
    #[must_use]
    pub const fn new(schema: &'a SchemaSource, value: &'a Value) -> Self {
        Self {
            schema,
            value,
            key_field: DEFAULT_CLIENT_ID_KEY,
        }
    }

    #[must_use]
    pub const fn with_key_field(mut self, key_field: &'a str) -> Self {
        self.key_field = key_field;
        self
    }
}

impl KeyResolver for SchemaKeyResolver<'_> {
    fn resolve(&self, path: &ServerPath, _indices: &[usize]) -> Option<Vec<ClientId>> {
        let mut ids = Vec::new();
        collect_keys(self.schema, self.value, path.segments(), self.key_field, &mut ids)?;

        (ids.len() == index_count(path)).then_some(ids)
    }
}

fn collect_keys(
    source: &SchemaSource,
    value: &Value,
    segments: &[ServerSegment],
    key_field: &str,
    ids: &mut Vec<ClientId>,
) -> Option<()> {
    let Some((ServerSegment::Field(name), rest)) = segments.split_first() else {
        return Some(());
    };
    let current = if value.is_object() { value } else { &Value::Null };
    let schema = source.resolve(current).ok()?;
    let child = current.get(name);

    match (schema.get(name), rest.split_first()) {
        (Some(SchemaNode::Object(nested)), _) => {
            collect_keys(nested, child.unwrap_or(&Value::Null), rest, key_field, ids)
        }
        (Some(SchemaNode::Array(array)), Some((ServerSegment::Index(index), rest))) => {
            let element = child?.get(*index)?;
            ids.push(array.key_of(element, key_field)?);
            collect_keys(&array.member, element, rest, key_field, ids)
        }
        // leaf fields, or trailing names the schema does not declare
        _ => Some(()),
    }
}

fn index_count(path: &ServerPath) -> usize {
    path.segments()
        .iter()
        .filter(|seg| matches!(seg, ServerSegment::Index(_)))
        .count()
}

///
/// TESTS
///
