use crate::{CardGroup, CardId, CardInstance, LockedSet};
use std::collections::BTreeSet;
use tracing::debug;

/// Outcome of one click on a card group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupToggle {
    /// Every member is locked; nothing to select.
    Unchanged,
    Added(CardId),
    /// The group was fully selected and has been released.
    Cleared(usize),
}

/// The user's working set of card instances. Local and optimistic: the
/// server never sees it until an action carries it out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<CardId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.ids.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = CardId> + '_ {
        self.ids.iter().copied()
    }

    /// Drops every member that is no longer in `hand` or is now locked.
    /// Never adds. Returns how many members were dropped.
    pub fn reconcile(&mut self, hand: &[CardInstance], locked: &LockedSet) -> usize {
        let before = self.ids.len();
        let eligible: BTreeSet<CardId> = hand
            .iter()
            .map(|card| card.id)
            .filter(|id| !locked.contains(id))
            .collect();
        self.ids.retain(|id| eligible.contains(id));
        let dropped = before - self.ids.len();
        if dropped > 0 {
            debug!(dropped, kept = self.ids.len(), "selection reconciled");
        }
        dropped
    }

    /// Per-label click: selects one more free member in group order until all
    /// free members are selected, then releases them all.
    pub fn toggle_group(&mut self, group: &CardGroup, locked: &LockedSet) -> GroupToggle {
        let free: Vec<CardId> = group.free_members(locked).collect();
        if free.is_empty() {
            return GroupToggle::Unchanged;
        }
        match free.iter().copied().find(|id| !self.ids.contains(id)) {
            Some(next) => {
                self.ids.insert(next);
                GroupToggle::Added(next)
            }
            None => {
                for id in &free {
                    self.ids.remove(id);
                }
                GroupToggle::Cleared(free.len())
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Selected identities minus `locked`, ready for an outbound payload.
    pub fn current_selection(&self, locked: &LockedSet) -> Vec<CardId> {
        self.ids
            .iter()
            .copied()
            .filter(|id| !locked.contains(id))
            .collect()
    }

    pub fn selected_in(&self, group: &CardGroup, locked: &LockedSet) -> usize {
        group
            .free_members(locked)
            .filter(|id| self.ids.contains(id))
            .count()
    }
}
