use crate::{CardId, CardInstance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete server-authoritative room state as seen by one player. Every
/// `state` message replaces the previous snapshot wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub round_no: u32,
    #[serde(default)]
    pub players: Vec<PlayerView>,
    #[serde(default)]
    pub tables: Vec<String>,
    #[serde(default)]
    pub my_pending: BTreeMap<String, Vec<PendingCommitment>>,
    #[serde(default)]
    pub last_round: Option<RoundResult>,
    #[serde(default)]
    pub battle_history: Vec<RoundResult>,
    #[serde(default)]
    pub active_count: u32,
    #[serde(default)]
    pub ready_count: u32,
    #[serde(default)]
    pub you_ready: bool,
    #[serde(default)]
    pub last_saved_ms: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerView {
    pub pid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hand: Vec<CardInstance>,
    #[serde(default)]
    pub archive: Vec<serde_json::Value>,
}

impl PlayerView {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.pid
        } else {
            &self.name
        }
    }
}

/// A submitted, unresolved play sitting on a table until the round resolves.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PendingCommitment {
    #[serde(default)]
    pub pid: Option<String>,
    #[serde(default)]
    pub card_ids: Vec<CardId>,
    #[serde(default)]
    pub cards: Vec<CardInstance>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub placed_seq: u64,
    #[serde(default)]
    pub cat: Option<i64>,
    #[serde(default)]
    pub placed_ms: Option<i64>,
}

impl PendingCommitment {
    /// Commitments without an owner are the viewer's own: `my_pending` only
    /// ever lists them.
    pub fn belongs_to(&self, pid: &str) -> bool {
        self.pid.as_deref().map_or(true, |owner| owner == pid)
    }

    pub fn card_ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.card_ids
            .iter()
            .copied()
            .chain(self.cards.iter().map(|card| card.id))
    }

    pub fn display_label(&self) -> String {
        if !self.label.is_empty() {
            return self.label.clone();
        }
        self.cards
            .iter()
            .map(|card| card.label.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoundResult {
    #[serde(default, alias = "round")]
    pub round_no: u32,
    #[serde(default)]
    pub tables: Vec<TableOutcome>,
    #[serde(default)]
    pub ts_ms: Option<i64>,
}

impl RoundResult {
    pub fn winner_on(&self, table: &str) -> Option<&PendingCommitment> {
        self.tables
            .iter()
            .find(|outcome| outcome.table == table)
            .and_then(|outcome| outcome.winner.as_ref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TableOutcome {
    pub table: String,
    #[serde(default)]
    pub winner: Option<PendingCommitment>,
    #[serde(default)]
    pub losers: Vec<PendingCommitment>,
}

impl TableOutcome {
    pub fn commitments(&self) -> impl Iterator<Item = &PendingCommitment> {
        self.winner.iter().chain(self.losers.iter())
    }
}

impl Snapshot {
    pub fn player(&self, pid: &str) -> Option<&PlayerView> {
        self.players.iter().find(|player| player.pid == pid)
    }

    pub fn hand_of(&self, pid: &str) -> &[CardInstance] {
        self.player(pid)
            .map(|player| player.hand.as_slice())
            .unwrap_or(&[])
    }

    pub fn opponents<'a>(&'a self, pid: &'a str) -> impl Iterator<Item = &'a PlayerView> + 'a {
        self.players.iter().filter(move |player| player.pid != pid)
    }

    /// Pending commitments per table, in the snapshot's table order. Tables the
    /// server lists under `my_pending` but not under `tables` follow at the end.
    pub fn pending_by_table(&self) -> Vec<(&str, &[PendingCommitment])> {
        let mut out: Vec<(&str, &[PendingCommitment])> = self
            .tables
            .iter()
            .map(|table| {
                let plays = self
                    .my_pending
                    .get(table)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                (table.as_str(), plays)
            })
            .collect();
        for (table, plays) in &self.my_pending {
            if !self.tables.iter().any(|known| known == table) {
                out.push((table.as_str(), plays.as_slice()));
            }
        }
        out
    }

    pub fn pending_count(&self) -> usize {
        self.my_pending.values().map(Vec::len).sum()
    }

    /// Most recent round first.
    pub fn history(&self) -> impl Iterator<Item = &RoundResult> {
        self.battle_history.iter().rev()
    }
}
