//! Core runtime for formtree: the form value tree, conditional schemas, the
//! validate visitor, client-id keyed error trees, server-error mapping, and
//! the submit/conflict state machine.
#![warn(unreachable_pub)]

pub mod attachment;
pub mod client_id;
pub mod error;
pub mod error_tree;
pub mod mapper;
pub mod patch;
pub mod path;
pub mod schema;
pub mod submit;
pub mod validate;
pub mod value;
pub mod wizard;

pub use formtree_config as config;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, mappers, or submit state are re-exported here.
///

pub mod prelude {
    pub use crate::{
        client_id::ClientId,
        error_tree::{ErrorArray, ErrorObject, ErrorTree},
        path::{Path, PathSegment},
        schema::{ArraySchema, FieldSchema, ObjectSchema, SchemaNode, SchemaSource, Validator},
        value::Value,
    };
}
