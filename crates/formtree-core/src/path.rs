use crate::client_id::ClientId;
use std::fmt::{self, Write};

///
/// PathSegment
///
/// One step into the form value tree. Array elements are addressed either by
/// position (`Index`) or by their client id (`Key`); error trees only ever
/// hold `Key`.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PathSegment {
    Field(String),
    Index(usize),
    Key(ClientId),
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::Field(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        Self::Field(s)
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<ClientId> for PathSegment {
    fn from(id: ClientId) -> Self {
        Self::Key(id)
    }
}

///
/// Path
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Path(Vec<PathSegment>);

impl Path {
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push(PathSegment::Field(name.into()));
        self
    }

    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<ClientId>) -> Self {
        self.0.push(PathSegment::Key(key.into()));
        self
    }

    pub fn push(&mut self, seg: PathSegment) {
        self.0.push(seg);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First field name on the path, i.e. the top-level form field it lives under.
    #[must_use]
    pub fn head_field(&self) -> Option<&str> {
        match self.0.first() {
            Some(PathSegment::Field(name)) => Some(name),
            _ => None,
        }
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_path(&self.0, f)
    }
}

/// Render `a.b[2]{id}.c`: fields dot-joined, indices bracketed, keys braced.
pub(crate) fn render_path(path: &[PathSegment], out: &mut impl Write) -> fmt::Result {
    let mut first = true;

    for seg in path {
        match seg {
            PathSegment::Field(s) => {
                if !first {
                    out.write_char('.')?;
                }
                out.write_str(s)?;
            }
            PathSegment::Index(i) => write!(out, "[{i}]")?,
            PathSegment::Key(id) => write!(out, "{{{id}}}")?,
        }
        first = false;
    }

    Ok(())
}

///
/// TESTS
///
