use crate::{
    client_id::ClientId,
    config::DEFAULT_CLIENT_ID_KEY,
    path::{Path, PathSegment},
    value::{Map, Value, kind_name},
};
use thiserror::Error as ThisError;

///
/// PathError
///
/// Structured failures for path-addressed updates.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PathError {
    #[error("invalid shape: expected {expected}, found {actual}")]
    InvalidShape {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("index {index} out of bounds for list of {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("no element with client id '{key}'")]
    UnknownKey { key: ClientId },

    #[error("update failed at {path}: {source}")]
    Context {
        path: String,
        #[source]
        source: Box<Self>,
    },
}

impl PathError {
    /// Prepend a field segment to the error path.
    #[must_use]
    pub fn with_field(self, field: impl AsRef<str>) -> Self {
        self.with_path_segment(field.as_ref())
    }

    /// Prepend an index segment to the error path.
    #[must_use]
    pub fn with_index(self, index: usize) -> Self {
        self.with_path_segment(format!("[{index}]"))
    }

    /// Prepend a client-id segment to the error path.
    #[must_use]
    pub fn with_key(self, key: &ClientId) -> Self {
        self.with_path_segment(format!("{{{key}}}"))
    }

    /// Return the full contextual path, if available.
    #[must_use]
    pub const fn path(&self) -> Option<&str> {
        match self {
            Self::Context { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }

    /// Return the innermost, non-context variant.
    #[must_use]
    pub fn leaf(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.leaf(),
            _ => self,
        }
    }

    #[must_use]
    fn with_path_segment(self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        match self {
            Self::Context { path, source } => Self::Context {
                path: Self::join_segments(segment.as_str(), path.as_str()),
                source,
            },
            source => Self::Context {
                path: segment,
                source: Box::new(source),
            },
        }
    }

    #[must_use]
    fn join_segments(prefix: &str, suffix: &str) -> String {
        if suffix.starts_with('[') || suffix.starts_with('{') {
            format!("{prefix}{suffix}")
        } else {
            format!("{prefix}.{suffix}")
        }
    }
}

/// Return a new tree with the value at `path` replaced.
/// Array elements addressed by client id are found via the default key field.
pub fn set_value_at_path(tree: &Value, path: &Path, value: Value) -> Result<Value, PathError> {
    set_value_at_path_with(tree, path, value, DEFAULT_CLIENT_ID_KEY)
}

/// [`set_value_at_path`] with an explicit client-id field.
///
/// Missing objects along the path are created; missing array elements are not.
pub fn set_value_at_path_with(
    tree: &Value,
    path: &Path,
    value: Value,
    key_field: &str,
) -> Result<Value, PathError> {
    set_in(tree, path.segments(), value, key_field)
}

fn set_in(
    node: &Value,
    segments: &[PathSegment],
    value: Value,
    key_field: &str,
) -> Result<Value, PathError> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(value);
    };

    match head {
        PathSegment::Field(name) => {
            let mut map = match node {
                Value::Object(map) => map.clone(),
                Value::Null => Map::new(),
                other => {
                    return Err(PathError::InvalidShape {
                        expected: "object",
                        actual: kind_name(other),
                    }
                    .with_field(name));
                }
            };
            let child = map.get(name).unwrap_or(&Value::Null);
            let next = set_in(child, rest, value, key_field).map_err(|err| err.with_field(name))?;
            map.insert(name.clone(), next);

            Ok(Value::Object(map))
        }

        PathSegment::Index(index) => {
            let mut items = expect_array(node)?;
            let len = items.len();
            let slot = items
                .get_mut(*index)
                .ok_or(PathError::IndexOutOfBounds { index: *index, len })?;
            *slot = set_in(slot, rest, value, key_field).map_err(|err| err.with_index(*index))?;

            Ok(Value::Array(items))
        }

        PathSegment::Key(key) => {
            let mut items = expect_array(node)?;
            let slot = items
                .iter_mut()
                .find(|item| ClientId::read(item, key_field).as_ref() == Some(key))
                .ok_or_else(|| PathError::UnknownKey { key: key.clone() })?;
            *slot = set_in(slot, rest, value, key_field).map_err(|err| err.with_key(key))?;

            Ok(Value::Array(items))
        }
    }
}

fn expect_array(node: &Value) -> Result<Vec<Value>, PathError> {
    match node {
        Value::Array(items) => Ok(items.clone()),
        other => Err(PathError::InvalidShape {
            expected: "array",
            actual: kind_name(other),
        }),
    }
}

/// Read the value at `path`, if present.
#[must_use]
pub fn get_value_at_path<'a>(tree: &'a Value, path: &Path, key_field: &str) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(tree, |node, seg| match seg {
            PathSegment::Field(name) => node.get(name),
            PathSegment::Index(index) => node.get(*index),
            PathSegment::Key(key) => node
                .as_array()?
                .iter()
                .find(|item| ClientId::read(item, key_field).as_ref() == Some(key)),
        })
}

///
/// TESTS
///
