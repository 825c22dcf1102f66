use crate::{ActionError, CardId, ClientMessage, SaveId};

/// Something the user asked for. Each action maps onto exactly one outbound
/// command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    DealToSelf { count: u32 },
    DealToAll { count: u32 },
    ClearHand,
    RemoveSelected,
    EvaluateSelected,
    PlaySelected { table: Option<String> },
    AddManualCard { card: String },
    AddUnknownCard,
    EndRoundVote,
    EndRoundForce,
    ListSaves,
    SaveCurrent { name: String },
    LoadSave { id: SaveId },
    DeleteSave { id: SaveId },
    WithdrawPlay { table: Option<String>, placed_seq: u64 },
}

impl Action {
    pub fn id(&self) -> &'static str {
        match self {
            Action::DealToSelf { .. } => "deal",
            Action::DealToAll { .. } => "deal_all",
            Action::ClearHand => "clear_hand",
            Action::RemoveSelected => "remove_selected",
            Action::EvaluateSelected => "eval_selected",
            Action::PlaySelected { .. } => "play_selected",
            Action::AddManualCard { .. } => "add_manual",
            Action::AddUnknownCard => "add_unknown",
            Action::EndRoundVote => "end_round_vote",
            Action::EndRoundForce => "end_round_force",
            Action::ListSaves => "saves_list",
            Action::SaveCurrent { .. } => "save_current",
            Action::LoadSave { .. } => "load_save",
            Action::DeleteSave { .. } => "delete_save",
            Action::WithdrawPlay { .. } => "remove_play",
        }
    }

    /// Actions whose cards leave the hand. The selection is cleared as soon as
    /// they are sent.
    pub fn consumes_selection(&self) -> bool {
        matches!(self, Action::RemoveSelected | Action::PlaySelected { .. })
    }
}

pub fn build_command(action: &Action, selection: Vec<CardId>) -> Result<ClientMessage, ActionError> {
    let message = match action {
        Action::DealToSelf { count } => ClientMessage::Deal { n: *count },
        Action::DealToAll { count } => ClientMessage::DealAll { n: *count },
        Action::ClearHand => ClientMessage::ClearHand,
        Action::RemoveSelected => ClientMessage::RemoveSelected {
            card_ids: selection,
        },
        Action::EvaluateSelected => ClientMessage::EvalSelected {
            card_ids: selection,
        },
        Action::PlaySelected { table } => ClientMessage::PlaySelected {
            card_ids: selection,
            table: required_table(table.as_deref())?,
        },
        Action::AddManualCard { card } => ClientMessage::AddManual {
            card: card.trim().to_string(),
        },
        Action::AddUnknownCard => ClientMessage::AddUnknown,
        Action::EndRoundVote => ClientMessage::EndRoundVote,
        Action::EndRoundForce => ClientMessage::EndRoundForce,
        Action::ListSaves => ClientMessage::SavesList,
        Action::SaveCurrent { name } => ClientMessage::SaveCurrent {
            name: name.trim().to_string(),
        },
        Action::LoadSave { id } => ClientMessage::LoadSave { id: id.clone() },
        Action::DeleteSave { id } => ClientMessage::DeleteSave { id: id.clone() },
        Action::WithdrawPlay { table, placed_seq } => ClientMessage::RemovePlay {
            table: required_table(table.as_deref())?,
            placed_seq: *placed_seq,
        },
    };
    Ok(message)
}

fn required_table(table: Option<&str>) -> Result<String, ActionError> {
    match table.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(ActionError::MissingTable),
    }
}
