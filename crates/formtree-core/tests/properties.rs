//! Behavioural guarantees of the engine, exercised through the public API.

use formtree_core::{
    client_id::{ClientId, SequenceGenerator},
    config::EngineConfig,
    error::SchemaError,
    mapper::{ErrorMapper, ServerError, ServerPath, ValueKeyResolver, match_array},
    patch::RowPatch,
    path::Path,
    schema::{ArraySchema, ConditionalSchema, FieldSchema, ObjectSchema, SchemaSource},
    submit::{FailureKind, FormState, ServerFailure, SubmitKind},
    validate::{Validated, validate},
    value::Value,
};
use proptest::prelude::*;
use serde_json::json;

fn rows_schema() -> SchemaSource {
    let member = ObjectSchema::new()
        .field("client_id", FieldSchema::new())
        .field("title", FieldSchema::new().required());

    ObjectSchema::new()
        .field("items", ArraySchema::new(member))
        .into()
}

fn interventions_schema() -> SchemaSource {
    let indicator = ObjectSchema::new()
        .field("client_id", FieldSchema::new())
        .field("title", FieldSchema::new().required());
    let intervention = ObjectSchema::new()
        .field("client_id", FieldSchema::new())
        .field("title", FieldSchema::new())
        .field("indicators", ArraySchema::new(indicator));

    ObjectSchema::new()
        .field("title", FieldSchema::new())
        .field("modified_at", FieldSchema::new())
        .field("planned_interventions", ArraySchema::new(intervention))
        .into()
}

fn row_patch() -> impl Strategy<Value = (bool, usize, usize)> {
    (any::<bool>(), 0..8usize, 0..8usize)
}

proptest! {
    // Errors follow their element through removals and reorders.
    #[test]
    fn errors_follow_elements_not_indices(
        blanks in prop::collection::vec(any::<bool>(), 1..8),
        ops in prop::collection::vec(row_patch(), 0..12),
    ) {
        let rows: Vec<Value> = blanks
            .iter()
            .enumerate()
            .map(|(i, blank)| {
                let title = if *blank { "" } else { "ok" };
                json!({ "client_id": format!("r{i}"), "title": title })
            })
            .collect();

        let mut form = FormState::new(rows_schema(), EngineConfig::default())
            .with_id_generator(SequenceGenerator::new("new"));
        form.hydrate(json!({ "items": rows })).expect("hydrate");
        form.validate().expect("validate");

        let items = Path::root().field("items");
        let patches: Vec<RowPatch> = ops
            .iter()
            .map(|&(remove, target, to)| {
                let key = format!("r{}", target % blanks.len());
                if remove { RowPatch::remove(key) } else { RowPatch::move_to(key, to) }
            })
            .collect();
        form.patch_rows(&items, patches).expect("patch");

        let surviving: Vec<ClientId> = form.value()["items"]
            .as_array()
            .expect("items stays a list")
            .iter()
            .filter_map(|row| ClientId::read(row, "client_id"))
            .collect();

        for (i, blank) in blanks.iter().enumerate() {
            let id = ClientId::new(format!("r{i}"));
            let message = form
                .errors()
                .at(&items.clone().key(id.clone()).field("title"))
                .and_then(|t| t.message());

            if surviving.contains(&id) {
                prop_assert_eq!(message.is_some(), *blank);
            } else {
                prop_assert!(message.is_none());
            }
        }
    }
}

#[test]
fn hidden_branch_submits_null_whatever_was_typed() {
    let base = ObjectSchema::new()
        .field("has_surge", FieldSchema::new())
        .field("surge_details", FieldSchema::new())
        .field("surge_count", FieldSchema::new());
    let schema = ConditionalSchema::new(base)
        .condition(["has_surge"], ["surge_details", "surge_count"], |w| {
            Ok(if w.is_true("has_surge") {
                ObjectSchema::new()
                    .field("surge_details", FieldSchema::new().required())
                    .field("surge_count", FieldSchema::new())
            } else {
                ObjectSchema::new()
                    .field("surge_details", FieldSchema::forced_null())
                    .field("surge_count", FieldSchema::forced_null())
            })
        })
        .into_source();

    let mut form = FormState::new(schema, EngineConfig::default());
    form.set_field(&Path::root().field("has_surge"), json!(true)).expect("set");
    form.set_field(&Path::root().field("surge_details"), json!("Two teams")).expect("set");
    form.set_field(&Path::root().field("surge_count"), json!(2)).expect("set");
    form.set_field(&Path::root().field("has_surge"), json!(false)).expect("set");

    let request = form.begin_submit(SubmitKind::Create).expect("valid");

    assert_eq!(request.body["surge_details"], Value::Null);
    assert_eq!(request.body["surge_count"], Value::Null);
}

#[test]
fn first_failing_validation_wins() {
    let schema: SchemaSource = ObjectSchema::new()
        .field(
            "budget",
            FieldSchema::new()
                .check(|_: &Value| Some("v1".to_string()))
                .check(|_: &Value| Some("v2".to_string())),
        )
        .into();

    let result = validate(&json!({ "budget": 5 }), &schema, &EngineConfig::default())
        .expect("sound");

    assert_eq!(
        result.errors().and_then(|e| e.message("budget")),
        Some("v1")
    );
}

#[test]
fn nested_and_row_level_paths_stay_distinct() {
    let value = json!({
        "planned_interventions": [
            { "client_id": "p0", "indicators": [] },
            { "client_id": "p1", "indicators": [{ "client_id": "i0" }] }
        ]
    });
    let mapper = ErrorMapper::from_schema(&interventions_schema(), &value).expect("sound");
    let deep = ServerPath::parse("planned_interventions.1.indicators.0.title");
    let shallow = ServerPath::parse("planned_interventions.1");

    let tree = mapper.transform_object_error(
        &[
            ServerError::new(deep.clone(), "deep"),
            ServerError::new(shallow.clone(), "shallow"),
        ],
        &ValueKeyResolver::new(&value),
    );

    let row = Path::root().field("planned_interventions").key("p1");
    assert_eq!(tree.at(&row).and_then(|t| t.message()), Some("shallow"));
    assert_eq!(
        tree.at(&row.clone().field("indicators").key("i0").field("title"))
            .and_then(|t| t.message()),
        Some("deep")
    );

    let most_specific = mapper
        .patterns()
        .iter()
        .find(|p| match_array(&deep, p).is_some())
        .expect("a pattern fits");
    assert_eq!(most_specific.to_string(), "planned_interventions.#.indicators.#.*");
}

#[test]
fn unmatched_server_path_becomes_non_field_error() {
    let mapper = ErrorMapper::from_schema(&rows_schema(), &json!({})).expect("sound");

    let tree = mapper.transform_object_error(
        &[ServerError::new(ServerPath::parse("a.0.b.1.c"), "odd")],
        &ValueKeyResolver::new(&json!({})),
    );

    assert_eq!(tree.internal.as_deref(), Some("a.0.b.1.c: odd"));
    assert!(tree.fields.is_empty());
}

#[test]
fn simple_required_field() {
    let schema: SchemaSource = ObjectSchema::new()
        .field("title", FieldSchema::new().required())
        .into();

    let result = validate(&json!({}), &schema, &EngineConfig::default()).expect("sound");

    let Validated::Invalid(errors) = result else {
        panic!("expected an error");
    };
    assert_eq!(errors.message("title"), Some("This field is required"));
}

#[test]
fn conditional_requiredness() {
    let schema = SchemaSource::dynamic(|value| {
        let x = if value.get("toggle") == Some(&json!(true)) {
            FieldSchema::new().required()
        } else {
            FieldSchema::forced_null()
        };
        Ok(ObjectSchema::new().field("toggle", FieldSchema::new()).field("x", x))
    });

    let result = validate(
        &json!({ "toggle": false, "x": "kept" }),
        &schema,
        &EngineConfig::default(),
    )
    .expect("sound");

    assert_eq!(result.value().map(|v| &v["x"]), Some(&Value::Null));
}

#[test]
fn array_error_remap() {
    let value = json!({ "items": [{ "client_id": "a" }, { "client_id": "b" }] });
    let mapper = ErrorMapper::from_schema(&rows_schema(), &value).expect("sound");

    let tree = mapper.transform_object_error(
        &[ServerError::new(ServerPath::parse("items.1.name"), "<msg>")],
        &ValueKeyResolver::new(&value),
    );

    assert_eq!(tree.to_json(), json!({ "items": { "b": { "name": "<msg>" } } }));
}

#[test]
fn obsolete_payload_routes_to_conflict() {
    let mut form = FormState::new(interventions_schema(), EngineConfig::default());
    form.hydrate(json!({ "title": "x", "modified_at": "2024-01-01T00:00:00Z" }))
        .expect("hydrate");
    form.begin_submit(SubmitKind::Update).expect("submit");

    let kind = form
        .finish_failure(&ServerFailure::form_errors(json!({
            "modified_at": ["OBSOLETE_PAYLOAD"]
        })))
        .expect("classify");

    assert_eq!(kind, FailureKind::Conflict);
    assert!(form.in_conflict());
    assert!(form.errors().is_empty());
}

#[test]
fn malformed_schema_function_is_fatal() {
    let schema = SchemaSource::dynamic(|_| Err(SchemaError::dynamic("boom")));

    let err = validate(&json!({}), &schema, &EngineConfig::default()).expect_err("fatal");

    assert!(matches!(err, SchemaError::DynamicSchema { .. }));
}
