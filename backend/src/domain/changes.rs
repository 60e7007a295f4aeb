//! Tagged partial-update builders.
//!
//! A partial update is a list of typed changes, one variant per writable
//! column. Adapters translate each variant to exactly one column, so the set
//! of columns a request can touch is fixed at compile time. Setting the same
//! column twice keeps the latest value.

/// A single typed column assignment.
pub trait TaggedChange {
    /// Column written by this change.
    fn column(&self) -> &'static str;
}

/// Ordered, de-duplicated collection of [`TaggedChange`] values.
///
/// # Examples
/// ```
/// use eatwhatnow::domain::{ChangeSet, InteractionChange};
///
/// let changes = ChangeSet::new()
///     .with(InteractionChange::Upvoted(true))
///     .with(InteractionChange::Upvoted(false));
/// assert_eq!(changes.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet<C> {
    changes: Vec<C>,
}

impl<C> Default for ChangeSet<C> {
    fn default() -> Self {
        Self {
            changes: Vec::new(),
        }
    }
}

impl<C: TaggedChange> ChangeSet<C> {
    /// Start an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `change`, replacing any earlier change to the same column.
    pub fn set(&mut self, change: C) {
        let column = change.column();
        match self.changes.iter_mut().find(|c| c.column() == column) {
            Some(slot) => *slot = change,
            None => self.changes.push(change),
        }
    }

    /// Builder form of [`ChangeSet::set`].
    #[must_use]
    pub fn with(mut self, change: C) -> Self {
        self.set(change);
        self
    }

    /// Builder form accepting an optional change.
    #[must_use]
    pub fn with_opt(self, change: Option<C>) -> Self {
        match change {
            Some(change) => self.with(change),
            None => self,
        }
    }

    /// True when no column would be written.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of columns written.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Iterate over the changes in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, C> {
        self.changes.iter()
    }

    /// Columns written, in insertion order.
    pub fn columns(&self) -> Vec<&'static str> {
        self.changes.iter().map(TaggedChange::column).collect()
    }
}

impl<'a, C> IntoIterator for &'a ChangeSet<C> {
    type Item = &'a C;
    type IntoIter = std::slice::Iter<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
