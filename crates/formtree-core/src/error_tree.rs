//! Client-id keyed error trees.
//!
//! The tree mirrors the value tree, except that array levels are maps from
//! client id to element errors. An error therefore stays with its element
//! when sibling rows are added, removed, or reordered.

use crate::{
    client_id::ClientId,
    path::{Path, PathSegment},
};
use serde::Serialize;
use std::collections::BTreeMap;

///
/// ErrorTree
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorTree {
    Leaf(String),
    Object(ErrorObject),
    Array(ErrorArray),
}

impl ErrorTree {
    /// Message on this node: the leaf text, or the `$internal` slot.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Leaf(message) => Some(message),
            Self::Object(obj) => obj.internal.as_deref(),
            Self::Array(arr) => arr.internal.as_deref(),
        }
    }

    /// Follow a path of field names and client ids.
    /// Index segments never resolve; errors are not addressed by position.
    #[must_use]
    pub fn at(&self, path: &[PathSegment]) -> Option<&Self> {
        let Some((head, rest)) = path.split_first() else {
            return Some(self);
        };

        let child = match (self, head) {
            (Self::Object(obj), PathSegment::Field(name)) => obj.fields.get(name)?,
            (Self::Array(arr), PathSegment::Key(id)) => arr.members.get(id)?,
            _ => return None,
        };

        child.at(rest)
    }

    fn at_mut(&mut self, path: &[PathSegment]) -> Option<&mut Self> {
        let Some((head, rest)) = path.split_first() else {
            return Some(self);
        };

        let child = match (self, head) {
            (Self::Object(obj), PathSegment::Field(name)) => obj.fields.get_mut(name)?,
            (Self::Array(arr), PathSegment::Key(id)) => arr.members.get_mut(id)?,
            _ => return None,
        };

        child.at_mut(rest)
    }

    fn insert(&mut self, path: &[PathSegment], message: String) {
        let Some((head, rest)) = path.split_first() else {
            match self {
                Self::Leaf(existing) => join_message(existing, message),
                Self::Object(obj) => push_internal(&mut obj.internal, message),
                Self::Array(arr) => push_internal(&mut arr.internal, message),
            }
            return;
        };

        match head {
            PathSegment::Field(name) => {
                let obj = self.as_object_mut();
                if rest.is_empty() && !obj.fields.contains_key(name) {
                    obj.fields.insert(name.clone(), Self::Leaf(message));
                    return;
                }
                obj.fields
                    .entry(name.clone())
                    .or_insert_with(|| Self::empty_for(rest))
                    .insert(rest, message);
            }
            PathSegment::Key(id) => {
                let arr = self.as_array_mut();
                arr.members
                    .entry(id.clone())
                    .or_insert_with(|| Self::Object(ErrorObject::default()))
                    .insert(rest, message);
            }
            PathSegment::Index(_) => {
                // positions must be resolved to client ids before insertion
                let obj = self.as_object_mut();
                let rendered = Path::from(path.to_vec()).to_string();
                push_internal(&mut obj.internal, format!("{rendered}: {message}"));
            }
        }
    }

    fn empty_for(rest: &[PathSegment]) -> Self {
        match rest.first() {
            Some(PathSegment::Key(_)) => Self::Array(ErrorArray::default()),
            _ => Self::Object(ErrorObject::default()),
        }
    }

    // A leaf that gains children keeps its text as the `$internal` message.
    fn as_object_mut(&mut self) -> &mut ErrorObject {
        if !matches!(self, Self::Object(_)) {
            let internal = self.message().map(ToString::to_string);
            *self = Self::Object(ErrorObject {
                internal,
                fields: BTreeMap::new(),
            });
        }
        match self {
            Self::Object(obj) => obj,
            _ => unreachable!("node was just converted to an object"),
        }
    }

    fn as_array_mut(&mut self) -> &mut ErrorArray {
        if !matches!(self, Self::Array(_)) {
            let internal = self.message().map(ToString::to_string);
            *self = Self::Array(ErrorArray {
                internal,
                members: BTreeMap::new(),
            });
        }
        match self {
            Self::Array(arr) => arr,
            _ => unreachable!("node was just converted to an array"),
        }
    }

    fn collect(&self, path: &mut Vec<PathSegment>, out: &mut Vec<(Path, String)>) {
        match self {
            Self::Leaf(message) => out.push((Path::from(path.clone()), message.clone())),
            Self::Object(obj) => obj.collect(path, out),
            Self::Array(arr) => {
                if let Some(message) = &arr.internal {
                    out.push((Path::from(path.clone()), message.clone()));
                }
                for (id, member) in &arr.members {
                    path.push(PathSegment::Key(id.clone()));
                    member.collect(path, out);
                    path.pop();
                }
            }
        }
    }
}

///
/// ErrorObject
///
/// Errors for one object level. `internal` holds the object's own message
/// (cross-field rules, non-field server errors at the root).
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ErrorObject {
    #[serde(rename = "$internal", skip_serializing_if = "Option::is_none")]
    pub internal: Option<String>,

    #[serde(flatten)]
    pub fields: BTreeMap<String, ErrorTree>,
}

impl ErrorObject {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.internal.is_none() && self.fields.is_empty()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ErrorTree> {
        self.fields.get(name)
    }

    /// Message directly on a field, whatever its shape.
    #[must_use]
    pub fn message(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(ErrorTree::message)
    }

    #[must_use]
    pub fn at(&self, path: &Path) -> Option<&ErrorTree> {
        let (head, rest) = path.segments().split_first()?;
        match head {
            PathSegment::Field(name) => self.fields.get(name)?.at(rest),
            _ => None,
        }
    }

    /// Record a message at `path`, creating intermediate levels as needed.
    /// Messages landing on the same node are joined with a space.
    pub fn insert(&mut self, path: &Path, message: impl Into<String>) {
        let message = message.into();
        let Some((head, rest)) = path.segments().split_first() else {
            push_internal(&mut self.internal, message);
            return;
        };

        match head {
            PathSegment::Field(name) => {
                if rest.is_empty() && !self.fields.contains_key(name) {
                    self.fields.insert(name.clone(), ErrorTree::Leaf(message));
                } else {
                    self.fields
                        .entry(name.clone())
                        .or_insert_with(|| ErrorTree::empty_for(rest))
                        .insert(rest, message);
                }
            }
            _ => {
                let rendered = path.to_string();
                push_internal(&mut self.internal, format!("{rendered}: {message}"));
            }
        }
    }

    /// Drop element errors of the array at `path` whose id fails `keep`.
    pub fn retain_members(&mut self, path: &Path, keep: impl Fn(&ClientId) -> bool) {
        let Some((PathSegment::Field(name), rest)) = path.segments().split_first() else {
            return;
        };
        let Some(ErrorTree::Array(arr)) = self.fields.get_mut(name).and_then(|t| t.at_mut(rest))
        else {
            return;
        };

        arr.members.retain(|id, _| keep(id));
        if arr.internal.is_none() && arr.members.is_empty() {
            self.prune_empty(path);
        }
    }

    // Removes the node at `path` when it holds nothing; only used after
    // retain_members so a cleared array does not leave `{}` behind.
    fn prune_empty(&mut self, path: &Path) {
        if let [PathSegment::Field(name)] = path.segments() {
            self.fields.remove(name);
        }
    }

    /// Remove a top-level field's errors.
    pub fn remove(&mut self, name: &str) -> Option<ErrorTree> {
        self.fields.remove(name)
    }

    /// Fold another tree into this one; messages on shared nodes are joined.
    pub fn merge(&mut self, other: Self) {
        for (path, message) in other.flatten() {
            self.insert(&path, message);
        }
    }

    /// Every message with its path, in tree order.
    #[must_use]
    pub fn flatten(&self) -> Vec<(Path, String)> {
        let mut out = Vec::new();
        self.collect(&mut Vec::new(), &mut out);

        out
    }

    fn collect(&self, path: &mut Vec<PathSegment>, out: &mut Vec<(Path, String)>) {
        if let Some(message) = &self.internal {
            out.push((Path::from(path.clone()), message.clone()));
        }
        for (name, child) in &self.fields {
            path.push(PathSegment::Field(name.clone()));
            child.collect(path, out);
            path.pop();
        }
    }

    /// JSON rendering handed to the UI layer.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

///
/// ErrorArray
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ErrorArray {
    #[serde(rename = "$internal", skip_serializing_if = "Option::is_none")]
    pub internal: Option<String>,

    #[serde(flatten)]
    pub members: BTreeMap<ClientId, ErrorTree>,
}

impl ErrorArray {
    #[must_use]
    pub fn member(&self, id: &ClientId) -> Option<&ErrorTree> {
        self.members.get(id)
    }
}

fn push_internal(slot: &mut Option<String>, message: String) {
    match slot {
        Some(existing) => join_message(existing, message),
        None => *slot = Some(message),
    }
}

fn join_message(existing: &mut String, message: String) {
    if existing.as_str() != message {
        existing.push(' ');
        existing.push_str(&message);
    }
}

///
/// TESTS
///
