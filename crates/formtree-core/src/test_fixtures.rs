//! Shared schemas for unit tests: a trimmed-down DREF application with one
//! conditional block, a nested array of interventions with indicators, and a
//! plain list of supplies.

use crate::{
    config::EngineConfig,
    error::SchemaError,
    schema::{ArraySchema, ConditionalSchema, FieldSchema, ObjectSchema, SchemaSource, Watched},
    value::Value,
};

pub(crate) fn config() -> EngineConfig {
    EngineConfig::default()
}

pub(crate) fn positive(value: &Value) -> Option<String> {
    match value.as_f64() {
        Some(n) if n > 0.0 => None,
        Some(_) => Some("must be greater than zero".to_string()),
        None => Some("must be a number".to_string()),
    }
}

pub(crate) fn indicator() -> ObjectSchema {
    ObjectSchema::new()
        .field("client_id", FieldSchema::new())
        .field("title", FieldSchema::new().required())
        .field("target", FieldSchema::new().check(positive))
}

pub(crate) fn intervention() -> ObjectSchema {
    ObjectSchema::new()
        .field("client_id", FieldSchema::new())
        .field("title", FieldSchema::new().required())
        .field("budget", FieldSchema::new().check(positive))
        .field("indicators", ArraySchema::new(indicator()))
}

fn surge_branch(w: &Watched) -> Result<ObjectSchema, SchemaError> {
    let details = if w.is_true("is_surge_personnel_deployed") {
        FieldSchema::new().required()
    } else {
        FieldSchema::forced_null()
    };

    Ok(ObjectSchema::new().field("surge_personnel_deployed", details))
}

pub(crate) fn dref_schema() -> SchemaSource {
    let base = ObjectSchema::new()
        .field("title", FieldSchema::new().required())
        .field("modified_at", FieldSchema::new())
        .field("is_surge_personnel_deployed", FieldSchema::new())
        .field("surge_personnel_deployed", FieldSchema::new())
        .field("planned_interventions", ArraySchema::new(intervention()));

    ConditionalSchema::new(base)
        .condition(
            ["is_surge_personnel_deployed"],
            ["surge_personnel_deployed"],
            surge_branch,
        )
        .into_source()
}
