use crate::{
    client_id::{ClientId, ClientIdGenerator, UlidGenerator, inject_client_ids, strip_client_ids},
    config::EngineConfig,
    error::SchemaError,
    error_tree::ErrorObject,
    mapper::{ErrorMapper, SchemaKeyResolver},
    patch::{
        PathError, RowPatch, apply_row_patches, get_value_at_path, set_value_at_path_with,
    },
    path::{Path, PathSegment},
    schema::{SchemaSource, array_schema_at},
    submit::{
        SubmitError,
        failure::{FailureKind, ServerFailure, classify_failure},
    },
    validate::{Validated, validate},
    value::{Map, Value, kind_name},
};
use derive_more::Display;
use std::fmt;
use tracing::debug;

///
/// SubmitKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitKind {
    Create,
    Update,
    Replace,
}

impl SubmitKind {
    #[must_use]
    pub const fn method(self) -> Method {
        match self {
            Self::Create => Method::Post,
            Self::Update => Method::Patch,
            Self::Replace => Method::Put,
        }
    }

    const fn carries_modified_at(self) -> bool {
        matches!(self, Self::Update | Self::Replace)
    }
}

///
/// Method
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Method {
    #[display("POST")]
    Post,
    #[display("PATCH")]
    Patch,
    #[display("PUT")]
    Put,
}

///
/// SubmitRequest
///
/// A request for the caller's REST client to execute.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitRequest {
    pub method: Method,
    pub body: Value,
}

///
/// SubmitContext
///
/// Per-form facts the submit path needs beyond the value itself.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmitContext {
    pub current_tab: Option<String>,
    pub modified_at: Option<Value>,
}

///
/// ConflictChoice
///

#[derive(Clone, Debug, PartialEq)]
pub enum ConflictChoice {
    /// Resubmit on top of the server's latest version.
    Overwrite { modified_at: Value },
    /// Leave the form as it is.
    Cancel,
}

///
/// FormState
///
/// One form instance: its value, schema, errors, and submit lifecycle.
/// At most one submission is in flight at a time.
///

pub struct FormState {
    value: Value,
    schema: SchemaSource,
    config: EngineConfig,
    errors: ErrorObject,
    pending: Option<SubmitKind>,
    conflict: Option<SubmitKind>,
    notification: Option<String>,
    debug_message: Option<String>,
    context: SubmitContext,
    ids: Box<dyn ClientIdGenerator>,
}

impl FormState {
    /// A blank form for a new entity.
    #[must_use]
    pub fn new(schema: impl Into<SchemaSource>, config: EngineConfig) -> Self {
        Self {
            value: Value::Object(Map::new()),
            schema: schema.into(),
            config,
            errors: ErrorObject::new(),
            pending: None,
            conflict: None,
            notification: None,
            debug_message: None,
            context: SubmitContext::default(),
            ids: Box::new(UlidGenerator),
        }
    }

    /// Replace the id generator (deterministic ids in fixtures).
    #[must_use]
    pub fn with_id_generator(mut self, ids: impl ClientIdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Load an existing entity: client ids are injected into every declared
    /// array and `modified_at` is remembered for the next update.
    pub fn hydrate(&mut self, mut value: Value) -> Result<(), SchemaError> {
        let key_field = self.config.keys.client_id.clone();
        inject_client_ids(&mut value, &self.schema, &key_field, self.ids.as_mut())?;

        self.context.modified_at = value
            .get(&self.config.keys.modified_at)
            .filter(|v| !v.is_null())
            .cloned();
        self.value = value;
        self.errors = ErrorObject::new();

        Ok(())
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub const fn errors(&self) -> &ErrorObject {
        &self.errors
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn context(&self) -> &SubmitContext {
        &self.context
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub const fn in_conflict(&self) -> bool {
        self.conflict.is_some()
    }

    #[must_use]
    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    #[must_use]
    pub fn debug_message(&self) -> Option<&str> {
        self.debug_message.as_deref()
    }

    pub fn set_current_tab(&mut self, tab: impl Into<String>) {
        self.context.current_tab = Some(tab.into());
    }

    /// Read the value at `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&Value> {
        get_value_at_path(&self.value, path, &self.config.keys.client_id)
    }

    /// Replace the value at `path`.
    pub fn set_field(&mut self, path: &Path, value: Value) -> Result<(), PathError> {
        self.value =
            set_value_at_path_with(&self.value, path, value, &self.config.keys.client_id)?;

        Ok(())
    }

    /// Edit the rows of the array at `path`. Errors of removed rows are
    /// dropped; errors of surviving rows stay attached to their ids.
    pub fn patch_rows(
        &mut self,
        path: &Path,
        patches: impl IntoIterator<Item = RowPatch>,
    ) -> Result<Vec<ClientId>, PathError> {
        let key_field = self.config.keys.client_id.clone();
        let mut rows = match self.get(path) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(rows)) => rows.clone(),
            Some(other) => {
                return Err(PathError::InvalidShape {
                    expected: "array",
                    actual: kind_name(other),
                });
            }
        };

        let added = apply_row_patches(&mut rows, patches, &key_field, self.ids.as_mut());
        self.set_field(path, Value::Array(rows))?;

        if !path.segments().iter().any(|s| matches!(s, PathSegment::Index(_))) {
            let live = self.row_keys(path, &key_field);
            self.errors.retain_members(path, |id| live.contains(id));
        }

        Ok(added)
    }

    // Keys the error tree files the rows at `path` under.
    fn row_keys(&self, path: &Path, key_field: &str) -> Vec<ClientId> {
        let array = match array_schema_at(&self.schema, &self.value, path, key_field) {
            Ok(array) => array,
            Err(err) => {
                debug!(%path, %err, "row keys read from the key field");
                None
            }
        };

        self.get(path)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|row| match &array {
                Some(array) => array.key_of(row, key_field),
                None => ClientId::read(row, key_field),
            })
            .collect()
    }

    /// Validate locally and store the resulting errors.
    pub fn validate(&mut self) -> Result<Validated, SchemaError> {
        let result = validate(&self.value, &self.schema, &self.config)?;
        self.errors = result.errors().cloned().unwrap_or_default();

        Ok(result)
    }

    /// Start a submission. Invalid forms never produce a request.
    pub fn begin_submit(&mut self, kind: SubmitKind) -> Result<SubmitRequest, SubmitError> {
        if self.pending.is_some() {
            return Err(SubmitError::Pending);
        }

        let mut body = match self.validate()? {
            Validated::Valid(body) => body,
            Validated::Invalid(errors) => {
                debug!(?kind, "submit blocked by validation errors");
                return Err(SubmitError::Invalid(errors));
            }
        };

        if self.config.submit.strip_client_ids {
            strip_client_ids(&mut body, &self.config.keys.client_id);
        }

        if kind.carries_modified_at()
            && let (Some(modified_at), Value::Object(map)) = (&self.context.modified_at, &mut body)
        {
            map.insert(self.config.keys.modified_at.clone(), modified_at.clone());
        }

        self.pending = Some(kind);
        self.conflict = None;
        self.notification = None;
        self.debug_message = None;

        Ok(SubmitRequest {
            method: kind.method(),
            body,
        })
    }

    /// The server accepted the submission; adopt its copy of the entity.
    pub fn finish_success(&mut self, response: Value) -> Result<(), SchemaError> {
        self.pending = None;
        self.conflict = None;
        self.notification = None;
        self.debug_message = None;

        self.hydrate(response)
    }

    /// The server rejected the submission.
    pub fn finish_failure(&mut self, failure: &ServerFailure) -> Result<FailureKind, SchemaError> {
        let kind = self.pending.take();

        let mapper = ErrorMapper::from_schema(&self.schema, &self.value)?
            .with_non_field_key(self.config.keys.non_field.clone());
        let resolver = SchemaKeyResolver::new(&self.schema, &self.value)
            .with_key_field(&self.config.keys.client_id);
        let classified = classify_failure(failure, &mapper, &resolver, &self.config);

        self.errors = classified.errors;
        self.notification = classified.notification;
        self.debug_message = classified.debug_message;
        self.conflict = match classified.kind {
            FailureKind::Conflict => Some(kind.unwrap_or(SubmitKind::Update)),
            FailureKind::Validation | FailureKind::Transport => None,
        };

        Ok(classified.kind)
    }

    /// Settle an obsolete-payload conflict. Overwriting adopts the server's
    /// `modified_at` and returns the request to re-issue; a resubmit that
    /// fails local validation leaves the conflict open.
    pub fn resolve_conflict(
        &mut self,
        choice: ConflictChoice,
    ) -> Result<Option<SubmitRequest>, SubmitError> {
        let Some(kind) = self.conflict.take() else {
            return Err(SubmitError::NoConflict);
        };

        match choice {
            ConflictChoice::Overwrite { modified_at } => {
                self.context.modified_at = Some(modified_at);
                let request = self.begin_submit(kind);
                if request.is_err() {
                    self.conflict = Some(kind);
                }

                request.map(Some)
            }
            ConflictChoice::Cancel => Ok(None),
        }
    }
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("value", &self.value)
            .field("errors", &self.errors)
            .field("pending", &self.pending)
            .field("conflict", &self.conflict)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
