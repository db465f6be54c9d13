//! Declarative form schemas.
//!
//! A schema maps field names to rules. Object schemas may be computed from
//! the current value (`SchemaSource::Dynamic`), which is how conditional
//! visibility and requiredness are expressed: the inactive branch pins its
//! fields with `force_value` instead of hiding them elsewhere.

pub mod array;
pub mod condition;
pub mod field;
pub mod object;

pub use array::{ArraySchema, KeySelector};
pub use condition::{Condition, ConditionalSchema, Watched, add_condition};
pub use field::{FieldSchema, Validator};
pub use object::{
    ObjectSchema, ObjectValidator, SchemaFn, SchemaNode, SchemaSource, array_schema_at,
    resolve_schema,
};
