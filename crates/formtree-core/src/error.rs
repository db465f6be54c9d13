use crate::{patch::PathError, submit::SubmitError};
use thiserror::Error as ThisError;

///
/// Error
///
/// Umbrella for every failure the core can return as an `Err`.
/// Field validation failures are never in here; they travel as `ErrorObject`.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

///
/// SchemaError
///
/// Programming mistakes in a schema or in hydration.
/// These are fatal to the operation that hit them and are never retried.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("schema function failed at '{path}': {message}")]
    DynamicSchema { path: String, message: String },

    #[error("condition on [{watched}] returned field '{field}' outside its affected set")]
    UndeclaredConditionField { watched: String, field: String },

    #[error("array element at '{path}' has no client id")]
    MissingClientId { path: String },

    #[error("expected an object at '{path}', found {actual}")]
    NonObjectValue { path: String, actual: &'static str },
}

impl SchemaError {
    /// Wrap a message returned by a schema closure.
    pub fn dynamic(message: impl Into<String>) -> Self {
        Self::DynamicSchema {
            path: String::new(),
            message: message.into(),
        }
    }

    /// Attach the rendered path where a dynamic schema failed, keeping any
    /// path already recorded deeper in the tree.
    #[must_use]
    pub(crate) fn at_path(self, rendered: &str) -> Self {
        match self {
            Self::DynamicSchema { path, message } if path.is_empty() => Self::DynamicSchema {
                path: rendered.to_string(),
                message,
            },
            other => other,
        }
    }
}
