//! Validation and normalization of a form value against its schema.
//!
//! Validation is non-failing at the traversal level: every field issue is
//! collected by path and returned as an `ErrorObject`. Only schema mistakes
//! (a failing schema function, an array element without a key) abort the
//! walk, as a `SchemaError`.

mod visitor;


pub use visitor::ValidateVisitor;

use crate::{
    config::EngineConfig, error::SchemaError, error_tree::ErrorObject, schema::SchemaSource,
    value::Value,
};

///
/// Validated
///

#[derive(Clone, Debug, PartialEq)]
pub enum Validated {
    /// Normalized value, ready to submit.
    Valid(Value),

    /// Errors mirroring the value, arrays keyed by client id.
    Invalid(ErrorObject),
}

impl Validated {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }

    #[must_use]
    pub const fn errors(&self) -> Option<&ErrorObject> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(errors) => Some(errors),
        }
    }

    pub fn into_result(self) -> Result<Value, ErrorObject> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(errors),
        }
    }
}

///
/// validate
/// Validate a form value, collecting issues by path.
///
pub fn validate(
    value: &Value,
    source: &SchemaSource,
    config: &EngineConfig,
) -> Result<Validated, SchemaError> {
    let mut visitor = ValidateVisitor::new(config);
    let normalized = visitor.visit_root(value, source)?;
    let errors = visitor.finish();

    if errors.is_empty() {
        Ok(Validated::Valid(normalized))
    } else {
        Ok(Validated::Invalid(errors))
    }
}
