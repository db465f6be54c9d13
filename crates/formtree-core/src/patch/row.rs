use crate::{
    client_id::{ClientId, ClientIdGenerator, new_row},
    value::{Map, Value},
};

///
/// RowPatch
///
/// Edits to a dynamic array, addressed by client id rather than position.
/// Applied in order; each patch sees the rows left by the previous one.
/// `Insert` and `Move` clamp out-of-bounds targets to the tail; `Remove`
/// and `Move` ignore unknown ids.
///

#[derive(Clone, Debug, PartialEq)]
pub enum RowPatch {
    Push { fields: Map<String, Value> },
    Insert { index: usize, fields: Map<String, Value> },
    Remove { key: ClientId },
    Move { key: ClientId, to: usize },
    Clear,
}

impl RowPatch {
    #[must_use]
    pub fn push(fields: Map<String, Value>) -> Self {
        Self::Push { fields }
    }

    #[must_use]
    pub fn remove(key: impl Into<ClientId>) -> Self {
        Self::Remove { key: key.into() }
    }

    #[must_use]
    pub fn move_to(key: impl Into<ClientId>, to: usize) -> Self {
        Self::Move {
            key: key.into(),
            to,
        }
    }
}

/// Apply row patches and return the ids given to newly added rows.
pub fn apply_row_patches(
    rows: &mut Vec<Value>,
    patches: impl IntoIterator<Item = RowPatch>,
    key_field: &str,
    ids: &mut dyn ClientIdGenerator,
) -> Vec<ClientId> {
    let mut added = Vec::new();

    for patch in patches {
        match patch {
            RowPatch::Push { fields } => {
                let row = new_row(fields, key_field, ids);
                added.extend(ClientId::read(&row, key_field));
                rows.push(row);
            }

            RowPatch::Insert { index, fields } => {
                let idx = index.min(rows.len());
                let row = new_row(fields, key_field, ids);
                added.extend(ClientId::read(&row, key_field));
                rows.insert(idx, row);
            }

            RowPatch::Remove { key } => {
                if let Some(idx) = position(rows, &key, key_field) {
                    rows.remove(idx);
                }
            }

            RowPatch::Move { key, to } => {
                if let Some(idx) = position(rows, &key, key_field) {
                    let row = rows.remove(idx);
                    let to = to.min(rows.len());
                    rows.insert(to, row);
                }
            }

            RowPatch::Clear => rows.clear(),
        }
    }

    added
}

fn position(rows: &[Value], key: &ClientId, key_field: &str) -> Option<usize> {
    rows.iter()
        .position(|row| ClientId::read(row, key_field).as_ref() == Some(key))
}

///
/// TESTS
///
