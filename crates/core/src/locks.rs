use crate::{CardId, Snapshot};
use std::collections::BTreeSet;

/// Identities of the local player's cards that already sit in a pending
/// commitment and can no longer be selected.
pub type LockedSet = BTreeSet<CardId>;

pub fn resolve_locked(snapshot: &Snapshot, local_pid: &str) -> LockedSet {
    snapshot
        .my_pending
        .values()
        .flatten()
        .filter(|commitment| commitment.belongs_to(local_pid))
        .flat_map(|commitment| commitment.card_ids())
        .collect()
}
