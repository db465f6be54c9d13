//! Builtin validators. Each works on the JSON value a field holds and
//! plugs into `FieldSchema::validation` / `ArraySchema::validation`.

pub mod collection;
pub mod num;
pub mod sum;
pub mod text;
pub mod web;

use formtree_core::value::Value;

/// Text content of a value, or the message to report when it is not text.
fn as_text(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| "value must be text".to_string())
}
