use crate::app::{App, PromptMode};
use crate::input::InputAction;
use cardroom_core::Action;

pub fn dispatch(app: &mut App, action: InputAction) {
    match action {
        InputAction::None => {}
        InputAction::Quit => app.should_quit = true,
        InputAction::ToggleHelp => app.show_help = !app.show_help,
        InputAction::NextFocus => app.cycle_focus(true),
        InputAction::PrevFocus => app.cycle_focus(false),
        InputAction::MoveUp => app.move_cursor(false),
        InputAction::MoveDown => app.move_cursor(true),
        InputAction::ToggleSelect => app.toggle_focused(),
        InputAction::ClearSelection => {
            if app.show_help {
                app.show_help = false;
            } else {
                app.clear_selection();
            }
        }
        InputAction::Activate => app.activate_primary(),
        InputAction::Deal => app.perform(Action::DealToSelf {
            count: app.deal_count,
        }),
        InputAction::DealAll => app.perform(Action::DealToAll {
            count: app.deal_count,
        }),
        InputAction::ClearHand => app.perform(Action::ClearHand),
        InputAction::RemoveSelected => app.perform(Action::RemoveSelected),
        InputAction::EvaluateSelected => app.perform(Action::EvaluateSelected),
        InputAction::PlaySelected => app.play_selected(),
        InputAction::AddManual => app.open_prompt(PromptMode::ManualCard),
        InputAction::AddUnknown => app.perform(Action::AddUnknownCard),
        InputAction::VoteEndRound => app.perform(Action::EndRoundVote),
        InputAction::ForceEndRound => app.perform(Action::EndRoundForce),
        InputAction::ListSaves => app.perform(Action::ListSaves),
        InputAction::SaveCurrent => app.open_prompt(PromptMode::SaveName),
        InputAction::LoadSave => app.open_prompt(PromptMode::LoadId),
        InputAction::DeleteSave => app.open_prompt(PromptMode::DeleteId),
        InputAction::WithdrawPlay => app.withdraw_play(),
        InputAction::Reconnect => app.reconnect(),
    }
}
