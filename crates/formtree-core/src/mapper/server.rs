use crate::value::Value;
use std::fmt;

///
/// ServerSegment
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ServerSegment {
    Field(String),
    Index(usize),
}

impl From<&str> for ServerSegment {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<usize> for ServerSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

///
/// ServerPath
///
/// A backend error address: field names interleaved with numeric indices,
/// e.g. `activities.2.supplies.0.title`.
///

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ServerPath(Vec<ServerSegment>);

impl ServerPath {
    #[must_use]
    pub const fn new(segments: Vec<ServerSegment>) -> Self {
        Self(segments)
    }

    /// Parse a dotted key; all-digit parts become indices.
    #[must_use]
    pub fn parse(key: &str) -> Self {
        let segments = key
            .split('.')
            .filter(|part| !part.is_empty())
            .map(|part| match part.parse::<usize>() {
                Ok(index) => ServerSegment::Index(index),
                Err(_) => ServerSegment::Field(part.to_string()),
            })
            .collect();

        Self(segments)
    }

    #[must_use]
    pub fn segments(&self) -> &[ServerSegment] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<ServerSegment>> FromIterator<S> for ServerPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for ServerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match seg {
                ServerSegment::Field(name) => f.write_str(name)?,
                ServerSegment::Index(index) => write!(f, "{index}")?,
            }
        }

        Ok(())
    }
}

///
/// ServerError
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerError {
    pub path: ServerPath,
    pub message: String,
}

impl ServerError {
    #[must_use]
    pub fn new(path: ServerPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

/// Flatten a `formErrors` payload into addressed messages.
///
/// Accepts flat maps keyed by dotted paths as well as nested shapes where
/// objects hold field errors, lists of strings hold messages for one field,
/// and other lists hold per-element errors by position.
#[must_use]
pub fn flatten_form_errors(form_errors: &Value) -> Vec<ServerError> {
    let mut out = Vec::new();
    walk(form_errors, &mut Vec::new(), &mut out);

    out
}

fn walk(value: &Value, prefix: &mut Vec<ServerSegment>, out: &mut Vec<ServerError>) {
    match value {
        Value::Null => {}
        Value::String(message) => push(prefix, message.clone(), out),
        Value::Array(items) if items.iter().all(Value::is_string) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .filter(|m| !m.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !joined.is_empty() {
                push(prefix, joined, out);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                prefix.push(ServerSegment::Index(index));
                walk(item, prefix, out);
                prefix.pop();
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                let depth = prefix.len();
                prefix.extend(ServerPath::parse(key).0);
                walk(child, prefix, out);
                prefix.truncate(depth);
            }
        }
        other => push(prefix, other.to_string(), out),
    }
}

fn push(prefix: &[ServerSegment], message: String, out: &mut Vec<ServerError>) {
    out.push(ServerError {
        path: ServerPath(prefix.to_vec()),
        message,
    });
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_splits_indices() {
        let path = ServerPath::parse("activities.2.supplies.0.title");

        assert_eq!(
            path.segments(),
            &[
                ServerSegment::from("activities"),
                ServerSegment::Index(2),
                ServerSegment::from("supplies"),
                ServerSegment::Index(0),
                ServerSegment::from("title"),
            ]
        );
        assert_eq!(path.to_string(), "activities.2.supplies.0.title");
    }

    #[test]
    fn flatten_handles_flat_and_nested_shapes() {
        let errors = flatten_form_errors(&json!({
            "title": ["This field may not be blank.", "Too short."],
            "items.1.name": "Required",
            "activities": [null, { "supplies": [{}, { "count": ["Must be positive."] }] }]
        }));

        let rendered: Vec<String> = errors
            .iter()
            .map(|e| format!("{}={}", e.path, e.message))
            .collect();

        assert_eq!(
            rendered,
            vec![
                "activities.1.supplies.1.count=Must be positive.",
                "items.1.name=Required",
                "title=This field may not be blank. Too short.",
            ]
        );
    }

    #[test]
    fn flatten_skips_empty_message_lists() {
        assert!(flatten_form_errors(&json!({ "title": [] })).is_empty());
    }
}
