use crate::{label_sort_key, CardId, CardInstance, LockedSet};
use std::collections::HashMap;

/// Cards of one hand that share a label. Members keep hand order so the
/// selection engine always picks duplicates in the same sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardGroup {
    pub label: String,
    pub members: Vec<CardId>,
}

impl CardGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn free_members<'a>(&'a self, locked: &'a LockedSet) -> impl Iterator<Item = CardId> + 'a {
        self.members
            .iter()
            .copied()
            .filter(move |id| !locked.contains(id))
    }

    pub fn locked_count(&self, locked: &LockedSet) -> usize {
        self.members.iter().filter(|id| locked.contains(id)).count()
    }
}

pub fn group_hand(hand: &[CardInstance]) -> Vec<CardGroup> {
    let mut groups: Vec<CardGroup> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for card in hand {
        let slot = *slots.entry(card.label.as_str()).or_insert_with(|| {
            groups.push(CardGroup {
                label: card.label.clone(),
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].members.push(card.id);
    }
    groups.sort_by(|a, b| label_sort_key(&a.label).cmp(&label_sort_key(&b.label)));
    groups
}

pub fn find_group<'a>(groups: &'a [CardGroup], label: &str) -> Option<&'a CardGroup> {
    groups.iter().find(|group| group.label == label)
}
