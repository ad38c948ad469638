//! Identity-based selection tracking for the change-review item list.

use std::collections::HashSet;

use super::GroupId;

/// Summary of a collection's selection against a given universe of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateState {
    /// No item in the universe is selected.
    Empty,
    /// Some, but not all, items in the universe are selected.
    Partial,
    /// Every item in the (non-empty) universe is selected.
    Full,
}

/// Tracks which item identities are currently selected.
///
/// The set stores identities, not positions, so a selection survives list
/// rebuilds for every item that still exists afterwards.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    selected: HashSet<GroupId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `identity` as selected. Returns `true` if the set changed.
    pub fn select(&mut self, identity: &GroupId) -> bool {
        self.selected.insert(identity.clone())
    }

    /// Removes `identity` from the selection. Returns `true` if the set changed.
    pub fn deselect(&mut self, identity: &GroupId) -> bool {
        self.selected.remove(identity)
    }

    /// Flips the selection state of `identity`.
    pub fn toggle(&mut self, identity: &GroupId) {
        if !self.selected.remove(identity) {
            self.selected.insert(identity.clone());
        }
    }

    /// Replaces the whole selection with `identities`.
    pub fn select_all<'a, I>(&mut self, identities: I)
    where
        I: IntoIterator<Item = &'a GroupId>,
    {
        self.selected = identities.into_iter().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, identity: &GroupId) -> bool {
        self.selected.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Drops every selected identity not present in `universe`.
    ///
    /// Returns `true` if anything was dropped. Called on every list rebuild
    /// so selection never leaks onto unrelated items that reuse a slot.
    pub fn retain_universe<'a, I>(&mut self, universe: I) -> bool
    where
        I: IntoIterator<Item = &'a GroupId>,
    {
        let known: HashSet<&GroupId> = universe.into_iter().collect();
        let before = self.selected.len();
        self.selected.retain(|id| known.contains(id));
        self.selected.len() != before
    }

    /// Computes the aggregate state against the *current* universe.
    ///
    /// The result is derived fresh on every call rather than from a cached
    /// count, which keeps it correct across rebuilds.
    pub fn aggregate_state<'a, I>(&self, universe: I) -> AggregateState
    where
        I: IntoIterator<Item = &'a GroupId>,
    {
        let mut total = 0usize;
        let mut selected = 0usize;
        for id in universe {
            total += 1;
            if self.selected.contains(id) {
                selected += 1;
            }
        }

        if selected == 0 {
            AggregateState::Empty
        } else if selected == total {
            AggregateState::Full
        } else {
            AggregateState::Partial
        }
    }
}
