use crate::mapper::server::{ServerPath, ServerSegment};
use std::fmt;

///
/// PatternSegment
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PatternSegment {
    /// Exactly this field name.
    Field(String),
    /// Any numeric index; captured.
    AnyIndex,
    /// Any field name.
    AnyField,
}

///
/// ArrayPattern
///
/// The shape of a server path: literal field names with index and field
/// wildcards. `planned_interventions.#.indicators.#.*` captures two indices.
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ArrayPattern(Vec<PatternSegment>);

impl ArrayPattern {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push(PatternSegment::Field(name.into()));
        self
    }

    #[must_use]
    pub fn any_index(mut self) -> Self {
        self.0.push(PatternSegment::AnyIndex);
        self
    }

    #[must_use]
    pub fn any_field(mut self) -> Self {
        self.0.push(PatternSegment::AnyField);
        self
    }

    #[must_use]
    pub fn segments(&self) -> &[PatternSegment] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of literal field names.
    #[must_use]
    pub fn literals(&self) -> usize {
        self.0
            .iter()
            .filter(|seg| matches!(seg, PatternSegment::Field(_)))
            .count()
    }

    /// Captured indices if `path` has exactly this shape.
    #[must_use]
    pub fn captures(&self, path: &ServerPath) -> Option<Vec<usize>> {
        match_array(path, self)
    }
}

impl From<Vec<PatternSegment>> for ArrayPattern {
    fn from(segments: Vec<PatternSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for ArrayPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match seg {
                PatternSegment::Field(name) => f.write_str(name)?,
                PatternSegment::AnyIndex => f.write_str("#")?,
                PatternSegment::AnyField => f.write_str("*")?,
            }
        }

        Ok(())
    }
}

/// Match a server path against a pattern.
///
/// Lengths must agree and literals must match exactly; returns the indices
/// at `AnyIndex` positions, in order.
#[must_use]
pub fn match_array(path: &ServerPath, pattern: &ArrayPattern) -> Option<Vec<usize>> {
    if path.len() != pattern.len() {
        return None;
    }

    let mut indices = Vec::new();
    for (seg, pat) in path.segments().iter().zip(pattern.segments()) {
        match (seg, pat) {
            (ServerSegment::Field(name), PatternSegment::Field(expected)) if name == expected => {}
            (ServerSegment::Field(_), PatternSegment::AnyField) => {}
            (ServerSegment::Index(index), PatternSegment::AnyIndex) => indices.push(*index),
            _ => return None,
        }
    }

    Some(indices)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> ArrayPattern {
        ArrayPattern::new()
            .field("planned_interventions")
            .any_index()
            .field("indicators")
            .any_index()
            .any_field()
    }

    #[test]
    fn captures_indices_in_order() {
        let path = ServerPath::parse("planned_interventions.1.indicators.0.title");

        assert_eq!(match_array(&path, &nested()), Some(vec![1, 0]));
    }

    #[test]
    fn length_must_match() {
        let short = ServerPath::parse("planned_interventions.1");

        assert_eq!(match_array(&short, &nested()), None);
    }

    #[test]
    fn literals_must_match() {
        let path = ServerPath::parse("activities.1.indicators.0.title");

        assert_eq!(match_array(&path, &nested()), None);
    }

    #[test]
    fn wildcards_do_not_cross_kinds() {
        let pattern = ArrayPattern::new().field("items").any_index();

        assert_eq!(match_array(&ServerPath::parse("items.name"), &pattern), None);
        assert_eq!(
            match_array(
                &ServerPath::parse("items.3"),
                &ArrayPattern::new().field("items").any_field()
            ),
            None
        );
    }

    #[test]
    fn display_uses_markers() {
        assert_eq!(nested().to_string(), "planned_interventions.#.indicators.#.*");
        assert_eq!(nested().literals(), 2);
    }
}
