//! Wizard tab layout and tab-level error aggregation.

use crate::error_tree::ErrorObject;
use std::collections::BTreeSet;
use tracing::debug;

///
/// Tab
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tab<T> {
    pub id: T,
    pub fields: BTreeSet<String>,
}

///
/// TabErrors
///
/// Which tabs hold errors, plus errors no tab owns.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TabErrors<T> {
    pub tabs: Vec<T>,
    pub non_field: Option<String>,
    pub unassigned: Vec<String>,
}

impl<T> TabErrors<T> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty() && self.non_field.is_none() && self.unassigned.is_empty()
    }
}

///
/// TabLayout
///
/// Ordered wizard tabs, each owning a set of top-level field names.
///

#[derive(Clone, Debug)]
pub struct TabLayout<T> {
    tabs: Vec<Tab<T>>,
}

impl<T: Clone + PartialEq> TabLayout<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { tabs: Vec::new() }
    }

    #[must_use]
    pub fn tab<I, S>(mut self, id: T, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tabs.push(Tab {
            id,
            fields: fields.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn ids(&self) -> impl Iterator<Item = &T> {
        self.tabs.iter().map(|tab| &tab.id)
    }

    /// The tab owning a top-level field.
    #[must_use]
    pub fn tab_of(&self, field: &str) -> Option<&T> {
        self.tabs
            .iter()
            .find(|tab| tab.fields.contains(field))
            .map(|tab| &tab.id)
    }

    /// Aggregate an error tree by tab, in tab order.
    #[must_use]
    pub fn tabs_with_errors(&self, errors: &ErrorObject) -> TabErrors<T> {
        let mut unassigned = Vec::new();
        let mut errored = Vec::new();

        for name in errors.fields.keys() {
            match self.tabs.iter().position(|tab| tab.fields.contains(name)) {
                Some(pos) => errored.push(pos),
                None => {
                    debug!(field = %name, "error on a field no tab owns");
                    unassigned.push(name.clone());
                }
            }
        }
        errored.sort_unstable();
        errored.dedup();

        TabErrors {
            tabs: errored.into_iter().map(|pos| self.tabs[pos].id.clone()).collect(),
            non_field: errors.internal.clone(),
            unassigned,
        }
    }

    /// First tab, in wizard order, holding an error.
    #[must_use]
    pub fn first_errored_tab(&self, errors: &ErrorObject) -> Option<&T> {
        self.tabs
            .iter()
            .find(|tab| errors.fields.keys().any(|name| tab.fields.contains(name)))
            .map(|tab| &tab.id)
    }

    #[must_use]
    pub fn next(&self, current: &T) -> Option<&T> {
        let pos = self.position(current)?;
        self.tabs.get(pos + 1).map(|tab| &tab.id)
    }

    #[must_use]
    pub fn previous(&self, current: &T) -> Option<&T> {
        let pos = self.position(current)?;
        pos.checked_sub(1)
            .and_then(|prev| self.tabs.get(prev))
            .map(|tab| &tab.id)
    }

    fn position(&self, id: &T) -> Option<usize> {
        self.tabs.iter().position(|tab| &tab.id == id)
    }
}

impl<T: Clone + PartialEq> Default for TabLayout<T> {
    fn default() -> Self {
        Self::new()
    }
}

///
/// TESTS
///
