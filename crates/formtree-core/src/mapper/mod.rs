//! Server-error mapping.
//!
//! The backend addresses errors by position (`activities.2.supplies.0`),
//! the form addresses them by client id. The mapper matches each server path
//! against a set of shape patterns, resolves the captured indices to the
//! client ids currently at those positions, and writes the message into an
//! [`ErrorObject`].

pub mod pattern;
pub mod resolver;
pub mod server;

pub use pattern::{ArrayPattern, PatternSegment, match_array};
pub use resolver::{KeyResolver, SchemaKeyResolver, ValueKeyResolver};
pub use server::{ServerError, ServerPath, ServerSegment, flatten_form_errors};

use crate::{
    client_id::ClientId,
    config::DEFAULT_NON_FIELD_KEY,
    error::SchemaError,
    error_tree::ErrorObject,
    path::{Path, PathSegment},
    schema::{SchemaNode, SchemaSource},
    value::Value,
};
use tracing::debug;

///
/// ErrorMapper
///
/// Ordered pattern set; the most specific pattern that fits a path wins.
///

#[derive(Clone, Debug)]
pub struct ErrorMapper {
    patterns: Vec<ArrayPattern>,
    non_field_key: String,
}

impl ErrorMapper {
    /// Build from explicit patterns, ordered by descending specificity
    /// (length, then number of literal names).
    #[must_use]
    pub fn new(patterns: impl IntoIterator<Item = ArrayPattern>) -> Self {
        let mut patterns: Vec<ArrayPattern> = patterns.into_iter().collect();
        patterns.sort();
        patterns.dedup();
        patterns.sort_by(|a, b| {
            b.len()
                .cmp(&a.len())
                .then_with(|| b.literals().cmp(&a.literals()))
        });

        Self {
            patterns,
            non_field_key: DEFAULT_NON_FIELD_KEY.to_string(),
        }
    }

    /// Derive patterns from the schema as resolved against `value`.
    ///
    /// Each array level contributes `arr`, `arr.#` and `arr.#.*`; each nested
    /// object contributes `obj.*`; the root contributes `*`. Dynamic member
    /// schemas are resolved per element so conditional fields are covered.
    pub fn from_schema(source: &SchemaSource, value: &Value) -> Result<Self, SchemaError> {
        let mut patterns = vec![ArrayPattern::new().any_field()];
        let mut prefix = Vec::new();
        collect_patterns(source, value, &mut prefix, &mut patterns)?;

        Ok(Self::new(patterns))
    }

    #[must_use]
    pub fn with_non_field_key(mut self, key: impl Into<String>) -> Self {
        self.non_field_key = key.into();
        self
    }

    #[must_use]
    pub fn patterns(&self) -> &[ArrayPattern] {
        &self.patterns
    }

    /// Rewrite position-addressed server errors into a client-id keyed tree.
    ///
    /// Errors whose element no longer exists are dropped. Non-field errors
    /// and paths no pattern fits land on the root `$internal` slot.
    #[must_use]
    pub fn transform_object_error(
        &self,
        errors: &[ServerError],
        resolver: &dyn KeyResolver,
    ) -> ErrorObject {
        let mut tree = ErrorObject::new();

        for error in errors {
            if error.path.is_empty() {
                tree.insert(&Path::root(), error.message.clone());
                continue;
            }

            let Some(indices) = self.patterns.iter().find_map(|p| match_array(&error.path, p))
            else {
                debug!(path = %error.path, "server error matched no pattern");
                tree.insert(&Path::root(), format!("{}: {}", error.path, error.message));
                continue;
            };

            let Some(ids) = resolver.resolve(&error.path, &indices) else {
                debug!(path = %error.path, "server error dropped, element no longer present");
                continue;
            };

            match self.rewrite(&error.path, ids) {
                Some(path) => tree.insert(&path, error.message.clone()),
                None => debug!(path = %error.path, "resolver returned too few client ids"),
            }
        }

        tree
    }

    /// [`Self::transform_object_error`] over a raw `formErrors` payload.
    #[must_use]
    pub fn transform_form_errors(
        &self,
        form_errors: &Value,
        resolver: &dyn KeyResolver,
    ) -> ErrorObject {
        self.transform_object_error(&flatten_form_errors(form_errors), resolver)
    }

    // Swap indices for ids; a trailing non-field key addresses its parent.
    fn rewrite(&self, server: &ServerPath, ids: Vec<ClientId>) -> Option<Path> {
        let mut ids = ids.into_iter();
        let mut path = Path::root();

        for seg in server.segments() {
            match seg {
                ServerSegment::Field(name) => path.push(PathSegment::Field(name.clone())),
                ServerSegment::Index(_) => path.push(PathSegment::Key(ids.next()?)),
            }
        }

        if matches!(path.segments().last(), Some(PathSegment::Field(name)) if *name == self.non_field_key)
        {
            path.pop();
        }

        Some(path)
    }
}

impl Default for ErrorMapper {
    fn default() -> Self {
        Self::new([ArrayPattern::new().any_field()])
    }
}

fn collect_patterns(
    source: &SchemaSource,
    value: &Value,
    prefix: &mut Vec<PatternSegment>,
    out: &mut Vec<ArrayPattern>,
) -> Result<(), SchemaError> {
    let current = if value.is_object() { value } else { &Value::Null };
    let schema = source.resolve(current)?;

    for (name, node) in schema.fields() {
        prefix.push(PatternSegment::Field(name.clone()));
        match node {
            SchemaNode::Field(_) => {}
            SchemaNode::Object(nested) => {
                out.push(pattern_of(prefix, [PatternSegment::AnyField]));
                collect_patterns(nested, current.get(name).unwrap_or(&Value::Null), prefix, out)?;
            }
            SchemaNode::Array(array) => {
                out.push(pattern_of(prefix, []));
                out.push(pattern_of(prefix, [PatternSegment::AnyIndex]));
                out.push(pattern_of(
                    prefix,
                    [PatternSegment::AnyIndex, PatternSegment::AnyField],
                ));

                prefix.push(PatternSegment::AnyIndex);
                let elements = current.get(name).and_then(Value::as_array);
                match elements {
                    Some(items) if !items.is_empty() => {
                        for item in items {
                            collect_patterns(&array.member, item, prefix, out)?;
                        }
                    }
                    _ => collect_patterns(&array.member, &Value::Null, prefix, out)?,
                }
                prefix.pop();
            }
        }
        prefix.pop();
    }

    Ok(())
}

fn pattern_of<const N: usize>(prefix: &[PatternSegment], tail: [PatternSegment; N]) -> ArrayPattern {
    let mut segments = prefix.to_vec();
    segments.extend(tail);

    ArrayPattern::from(segments)
}

///
/// TESTS
///
