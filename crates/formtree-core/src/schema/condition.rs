//! Conditional field sets layered onto a base object schema.
//!
//! A condition watches some fields and owns some others. When it is
//! resolved, the owned ("affected") fields are removed from the schema and
//! replaced with whatever its branch returns for the watched values.
//! Layers apply in declaration order; when two layers own the same field,
//! the later layer wins.

use crate::{
    error::SchemaError,
    schema::{ObjectSchema, SchemaSource},
    value::{Value, is_truthy},
};
use std::{collections::BTreeMap, fmt, sync::Arc};
use tracing::debug;

/// Branch of a condition: field rules for the affected names.
pub type BranchFn = Arc<dyn Fn(&Watched) -> Result<ObjectSchema, SchemaError> + Send + Sync>;

///
/// Watched
///
/// Projection of the current value onto the watched field names.
/// Branches cannot read anything else.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Watched {
    values: BTreeMap<String, Value>,
}

impl Watched {
    fn project<S: AsRef<str>>(value: &Value, names: &[S]) -> Self {
        let values = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let current = value.get(name).cloned().unwrap_or(Value::Null);
                (name.to_string(), current)
            })
            .collect();

        Self { values }
    }

    /// Watched value, `null` when unset.
    #[must_use]
    pub fn get(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&Value::Null)
    }

    #[must_use]
    pub fn is_true(&self, name: &str) -> bool {
        is_truthy(self.get(name))
    }

    #[must_use]
    pub fn as_str(&self, name: &str) -> Option<&str> {
        self.get(name).as_str()
    }

    #[must_use]
    pub fn as_i64(&self, name: &str) -> Option<i64> {
        self.get(name).as_i64()
    }

    /// True when the watched value equals `expected`.
    #[must_use]
    pub fn is(&self, name: &str, expected: impl Into<Value>) -> bool {
        *self.get(name) == expected.into()
    }
}

/// Replace the `affected` fields of `base` with the branch's rules for the
/// current `watched` values.
pub fn add_condition<W, A, F>(
    mut base: ObjectSchema,
    value: &Value,
    watched: &[W],
    affected: &[A],
    branch: F,
) -> Result<ObjectSchema, SchemaError>
where
    W: AsRef<str>,
    A: AsRef<str>,
    F: FnOnce(&Watched) -> Result<ObjectSchema, SchemaError>,
{
    let projected = Watched::project(value, watched);
    let replacement = branch(&projected)?;

    for name in affected {
        base.remove(name.as_ref());
    }

    for (name, node) in replacement.fields() {
        if !affected.iter().any(|a| a.as_ref() == name) {
            return Err(SchemaError::UndeclaredConditionField {
                watched: join_names(watched),
                field: name.clone(),
            });
        }
        base.insert(name.clone(), node.clone());
    }

    Ok(base)
}

fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

///
/// Condition
///

#[derive(Clone)]
pub struct Condition {
    watched: Vec<String>,
    affected: Vec<String>,
    branch: BranchFn,
}

impl Condition {
    pub fn new<W, A, F>(watched: W, affected: A, branch: F) -> Self
    where
        W: IntoIterator,
        W::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
        F: Fn(&Watched) -> Result<ObjectSchema, SchemaError> + Send + Sync + 'static,
    {
        Self {
            watched: watched.into_iter().map(Into::into).collect(),
            affected: affected.into_iter().map(Into::into).collect(),
            branch: Arc::new(branch),
        }
    }

    #[must_use]
    pub fn watched(&self) -> &[String] {
        &self.watched
    }

    #[must_use]
    pub fn affected(&self) -> &[String] {
        &self.affected
    }

    /// Apply this layer on top of `schema`.
    pub fn apply(&self, schema: ObjectSchema, value: &Value) -> Result<ObjectSchema, SchemaError> {
        add_condition(schema, value, &self.watched, &self.affected, |watched| {
            (self.branch)(watched)
        })
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("watched", &self.watched)
            .field("affected", &self.affected)
            .finish_non_exhaustive()
    }
}

///
/// ConditionalSchema
///
/// A base schema plus an ordered stack of conditions.
///

#[derive(Clone, Debug, Default)]
pub struct ConditionalSchema {
    base: ObjectSchema,
    conditions: Vec<Condition>,
}

impl ConditionalSchema {
    #[must_use]
    pub fn new(base: ObjectSchema) -> Self {
        Self {
            base,
            conditions: Vec::new(),
        }
    }

    /// Push a layer. Overlap with an earlier layer is allowed; the new layer
    /// takes precedence for the shared names.
    #[must_use]
    pub fn layer(mut self, condition: Condition) -> Self {
        for earlier in &self.conditions {
            let shared: Vec<&String> = condition
                .affected
                .iter()
                .filter(|name| earlier.affected.contains(*name))
                .collect();

            if !shared.is_empty() {
                debug!(
                    ?shared,
                    earlier = ?earlier.watched,
                    later = ?condition.watched,
                    "condition layers overlap; later layer wins"
                );
            }
        }
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn condition<W, A, F>(self, watched: W, affected: A, branch: F) -> Self
    where
        W: IntoIterator,
        W::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
        F: Fn(&Watched) -> Result<ObjectSchema, SchemaError> + Send + Sync + 'static,
    {
        self.layer(Condition::new(watched, affected, branch))
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Base schema with every layer applied, in order.
    pub fn resolve(&self, value: &Value) -> Result<ObjectSchema, SchemaError> {
        self.conditions
            .iter()
            .try_fold(self.base.clone(), |schema, condition| {
                condition.apply(schema, value)
            })
    }

    #[must_use]
    pub fn into_source(self) -> SchemaSource {
        let schema = Arc::new(self);

        SchemaSource::dynamic(move |value| schema.resolve(value))
    }
}

impl From<ConditionalSchema> for SchemaSource {
    fn from(schema: ConditionalSchema) -> Self {
        schema.into_source()
    }
}

///
/// TESTS
///
