//! Submission lifecycle: local validation gate, request building, failure
//! classification, and obsolete-payload conflict resolution.

pub mod failure;
pub mod state;

pub use failure::{
    ClassifiedFailure, FailureKind, FailureValue, ServerFailure, classify_failure, mentions_code,
};
pub use state::{ConflictChoice, FormState, Method, SubmitContext, SubmitKind, SubmitRequest};

use crate::{error::SchemaError, error_tree::ErrorObject};
use thiserror::Error as ThisError;

///
/// SubmitError
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum SubmitError {
    #[error("a submission is already pending")]
    Pending,

    #[error("form has validation errors")]
    Invalid(ErrorObject),

    #[error("there is no conflict to resolve")]
    NoConflict,

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
