use derive_more::Display;
use formtree_config::ConfigError;
use formtree_core::{
    error::{Error as CoreError, SchemaError},
    patch::PathError,
    submit::SubmitError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable class + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        let kind = match err {
            SchemaError::DynamicSchema { .. } => SchemaErrorKind::DynamicSchema,
            SchemaError::UndeclaredConditionField { .. } => SchemaErrorKind::UndeclaredField,
            SchemaError::MissingClientId { .. } => SchemaErrorKind::MissingClientId,
            SchemaError::NonObjectValue { .. } => SchemaErrorKind::NonObjectValue,
        };

        Self::new(ErrorKind::Schema(kind), ErrorOrigin::Schema, err.to_string())
    }
}

impl From<PathError> for Error {
    fn from(err: PathError) -> Self {
        let message = err.to_string();

        Self::new(
            ErrorKind::Update(UpdateErrorKind::from(err)),
            ErrorOrigin::Patch,
            message,
        )
    }
}

impl From<SubmitError> for Error {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Schema(err) => err.into(),
            SubmitError::Pending => Self::new(
                ErrorKind::Submit(SubmitErrorKind::Pending),
                ErrorOrigin::Submit,
                err.to_string(),
            ),
            SubmitError::Invalid(_) => Self::new(
                ErrorKind::Submit(SubmitErrorKind::Invalid),
                ErrorOrigin::Submit,
                err.to_string(),
            ),
            SubmitError::NoConflict => Self::new(
                ErrorKind::Submit(SubmitErrorKind::NoConflict),
                ErrorOrigin::Submit,
                err.to_string(),
            ),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Schema(err) => err.into(),
            CoreError::Path(err) => err.into(),
            CoreError::Submit(err) => err.into(),
        }
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Schema(SchemaErrorKind),
    Update(UpdateErrorKind),
    Submit(SubmitErrorKind),

    /// Configuration could not be read or parsed.
    Config,
}

///
/// SchemaErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SchemaErrorKind {
    /// A schema function failed.
    DynamicSchema,

    /// A condition branch returned a field it does not own.
    UndeclaredField,

    /// An array element carried no client id.
    MissingClientId,

    /// The form root was not an object.
    NonObjectValue,
}

///
/// UpdateErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum UpdateErrorKind {
    /// The value at the path had the wrong shape.
    InvalidShape,

    /// The addressed row does not exist.
    MissingRow,
}

impl From<PathError> for UpdateErrorKind {
    fn from(err: PathError) -> Self {
        match err {
            PathError::InvalidShape { .. } => Self::InvalidShape,
            PathError::IndexOutOfBounds { .. } | PathError::UnknownKey { .. } => Self::MissingRow,
            PathError::Context { source, .. } => (*source).into(),
        }
    }
}

///
/// SubmitErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SubmitErrorKind {
    /// A submission is already in flight.
    Pending,

    /// Local validation failed; nothing was sent.
    Invalid,

    /// No obsolete-payload conflict was open.
    NoConflict,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Patch,
    Schema,
    Submit,
}

///
/// TESTS
///
