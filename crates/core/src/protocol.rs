//! Wire shapes for the room socket. Every frame is one JSON object tagged by
//! `type`.

use crate::{CardId, CardInstance, RoundResult, Snapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        room: String,
        name: String,
        pid: String,
    },
    Deal {
        n: u32,
    },
    DealAll {
        n: u32,
    },
    ClearHand,
    RemoveSelected {
        card_ids: Vec<CardId>,
    },
    EvalSelected {
        card_ids: Vec<CardId>,
    },
    PlaySelected {
        card_ids: Vec<CardId>,
        table: String,
    },
    AddManual {
        card: String,
    },
    AddUnknown,
    EndRoundVote,
    EndRoundForce,
    Hints,
    SaveCurrent {
        name: String,
    },
    SavesList,
    LoadSave {
        id: SaveId,
    },
    DeleteSave {
        id: SaveId,
    },
    RemovePlay {
        table: String,
        placed_seq: u64,
    },
    Leave,
}

impl ClientMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            ClientMessage::Join { .. } => "join",
            ClientMessage::Deal { .. } => "deal",
            ClientMessage::DealAll { .. } => "deal_all",
            ClientMessage::ClearHand => "clear_hand",
            ClientMessage::RemoveSelected { .. } => "remove_selected",
            ClientMessage::EvalSelected { .. } => "eval_selected",
            ClientMessage::PlaySelected { .. } => "play_selected",
            ClientMessage::AddManual { .. } => "add_manual",
            ClientMessage::AddUnknown => "add_unknown",
            ClientMessage::EndRoundVote => "end_round_vote",
            ClientMessage::EndRoundForce => "end_round_force",
            ClientMessage::Hints => "hints",
            ClientMessage::SaveCurrent { .. } => "save_current",
            ClientMessage::SavesList => "saves_list",
            ClientMessage::LoadSave { .. } => "load_save",
            ClientMessage::DeleteSave { .. } => "delete_save",
            ClientMessage::RemovePlay { .. } => "remove_play",
            ClientMessage::Leave => "leave",
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Joined {
        #[serde(default)]
        room: String,
    },
    State {
        state: Snapshot,
    },
    EvalResult(EvalResult),
    HintsResult(HintsResult),
    RoundResult {
        round: RoundResult,
    },
    Error {
        #[serde(default, alias = "error")]
        message: String,
    },
    SavesList {
        #[serde(default)]
        items: Vec<SaveEntry>,
    },
    SaveDone,
    SaveDeleted,
    SaveLoaded,
    /// Tags this client does not know yet.
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EvalResult {
    #[serde(default)]
    pub cards: Vec<CardRef>,
    #[serde(default)]
    pub label: String,
}

impl EvalResult {
    pub fn summary(&self) -> String {
        let cards: Vec<&str> = self.cards.iter().map(CardRef::label).collect();
        format!("{}: {}", self.label, cards.join(" "))
    }
}

/// Evaluation replies list cards either as bare labels or as full instances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CardRef {
    Label(String),
    Card(CardInstance),
}

impl CardRef {
    pub fn label(&self) -> &str {
        match self {
            CardRef::Label(label) => label,
            CardRef::Card(card) => &card.label,
        }
    }
}

/// Result of the combination search. The combinations themselves are opaque
/// to the client; only their counts are shown.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HintsResult {
    #[serde(default)]
    pub pairs: Vec<serde_json::Value>,
    #[serde(default)]
    pub trips: Vec<serde_json::Value>,
    #[serde(default)]
    pub quads: Vec<serde_json::Value>,
    #[serde(default)]
    pub straights5: Vec<serde_json::Value>,
    #[serde(default)]
    pub flushes5: Vec<serde_json::Value>,
    #[serde(default)]
    pub count: u64,
}

impl HintsResult {
    pub fn summary(&self) -> String {
        format!(
            "pairs {} trips {} quads {} straights {} flushes {} (total {})",
            self.pairs.len(),
            self.trips.len(),
            self.quads.len(),
            self.straights5.len(),
            self.flushes5.len(),
            self.count
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum SaveId {
    Number(i64),
    Text(String),
}

impl SaveId {
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        trimmed
            .parse::<i64>()
            .map(SaveId::Number)
            .unwrap_or_else(|_| SaveId::Text(trimmed.to_string()))
    }
}

impl fmt::Display for SaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveId::Number(value) => write!(f, "{value}"),
            SaveId::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveEntry {
    pub id: SaveId,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "ts_ms", alias = "created_ms")]
    pub saved_ms: Option<i64>,
}
