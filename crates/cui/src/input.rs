use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    ToggleHelp,
    NextFocus,
    PrevFocus,
    MoveUp,
    MoveDown,
    ToggleSelect,
    ClearSelection,
    Activate,
    Deal,
    DealAll,
    ClearHand,
    RemoveSelected,
    EvaluateSelected,
    PlaySelected,
    AddManual,
    AddUnknown,
    VoteEndRound,
    ForceEndRound,
    ListSaves,
    SaveCurrent,
    LoadSave,
    DeleteSave,
    WithdrawPlay,
    Reconnect,
}

pub fn map_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Esc => InputAction::ClearSelection,
        KeyCode::Tab => InputAction::NextFocus,
        KeyCode::BackTab => InputAction::PrevFocus,
        KeyCode::Up | KeyCode::Char('k') => InputAction::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => InputAction::MoveDown,
        KeyCode::Enter => InputAction::Activate,
        KeyCode::Char('q') => InputAction::Quit,
        KeyCode::Char('?') => InputAction::ToggleHelp,
        KeyCode::Char(' ') => InputAction::ToggleSelect,
        KeyCode::Char('d') => InputAction::Deal,
        KeyCode::Char('D') => InputAction::DealAll,
        KeyCode::Char('C') => InputAction::ClearHand,
        KeyCode::Char('x') => InputAction::RemoveSelected,
        KeyCode::Char('e') => InputAction::EvaluateSelected,
        KeyCode::Char('p') => InputAction::PlaySelected,
        KeyCode::Char('a') => InputAction::AddManual,
        KeyCode::Char('u') => InputAction::AddUnknown,
        KeyCode::Char('v') => InputAction::VoteEndRound,
        KeyCode::Char('F') => InputAction::ForceEndRound,
        KeyCode::Char('l') => InputAction::ListSaves,
        KeyCode::Char('S') => InputAction::SaveCurrent,
        KeyCode::Char('L') => InputAction::LoadSave,
        KeyCode::Char('X') => InputAction::DeleteSave,
        KeyCode::Char('w') => InputAction::WithdrawPlay,
        KeyCode::Char('R') => InputAction::Reconnect,
        _ => InputAction::None,
    }
}
