use crate::config::LaunchOptions;
use cardroom_core::{
    Action, CardGroup, GroupToggle, Identity, PendingCommitment, RoundResult, SaveId, Session,
    SessionError, SessionPhase, SessionUpdate, Snapshot, TransportEvent,
};
use cardroom_net::WsTransport;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

const MAX_EVENT_LOG: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Hand,
    Tables,
    Round,
    Events,
}

impl FocusPane {
    pub fn label(self) -> &'static str {
        match self {
            FocusPane::Hand => "Hand",
            FocusPane::Tables => "Tables",
            FocusPane::Round => "Round",
            FocusPane::Events => "Events",
        }
    }
}

/// Single-line text entry shown as a popup. Each mode feeds one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    ManualCard,
    SaveName,
    LoadId,
    DeleteId,
}

impl PromptMode {
    pub fn title(self) -> &'static str {
        match self {
            PromptMode::ManualCard => "Add Card",
            PromptMode::SaveName => "Save Room",
            PromptMode::LoadId => "Load Save",
            PromptMode::DeleteId => "Delete Save",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            PromptMode::ManualCard => "Card label such as A♠, 10h or Qd",
            PromptMode::SaveName => "Name for the saved room (may be empty)",
            PromptMode::LoadId => "Save id to load (l lists saves)",
            PromptMode::DeleteId => "Save id to delete (l lists saves)",
        }
    }
}

pub struct App {
    pub session: Session<WsTransport>,
    pub events: Receiver<TransportEvent>,
    pub endpoint: Url,
    pub deal_count: u32,
    pub focus: FocusPane,
    pub hand_cursor: usize,
    pub table_cursor: usize,
    pub chosen_table: Option<String>,
    pub event_log: VecDeque<String>,
    pub status_line: String,
    pub show_help: bool,
    pub prompt_mode: Option<PromptMode>,
    pub prompt_input: String,
    pub should_quit: bool,
}

impl App {
    pub fn new(options: &LaunchOptions, identity: Identity, endpoint: Url) -> Self {
        let (transport, events) = WsTransport::new(endpoint.clone());
        Self {
            session: Session::new(identity, transport),
            events,
            endpoint,
            deal_count: options.deal_count,
            focus: FocusPane::Hand,
            hand_cursor: 0,
            table_cursor: 0,
            chosen_table: None,
            event_log: VecDeque::new(),
            status_line: "ready".to_string(),
            show_help: false,
            prompt_mode: None,
            prompt_input: String::new(),
            should_quit: false,
        }
    }

    pub fn start(&mut self) {
        match self.session.connect() {
            Ok(()) => self.push_status(format!("connecting to {}", self.endpoint)),
            Err(err) => self.push_status(format!("connect failed: {err}")),
        }
    }

    /// Drops the current connection and opens a new one. The selection and
    /// the last snapshot carry over.
    pub fn reconnect(&mut self) {
        let identity = self.session.identity().clone();
        if self.session.phase() != SessionPhase::Closed {
            self.session.disconnect();
        }
        let ctx = self.session.take_context();
        let (transport, events) = WsTransport::new(self.endpoint.clone());
        self.session = Session::with_context(identity, transport, ctx);
        self.events = events;
        info!(endpoint = %self.endpoint, "reconnecting");
        self.push_event_line("reconnecting".to_string());
        self.start();
    }

    /// Leaves the room and gives the socket worker `grace` to flush the
    /// notice before the process exits.
    pub fn shutdown(&mut self, grace: Duration) {
        self.session.disconnect();
        if !self.session.transport_mut().shutdown(grace) {
            info!("socket did not close within {grace:?}");
        }
    }

    /// Feeds everything the transport reported since the last tick into the
    /// session, then fires the hints query if its quiet window has passed.
    pub fn on_tick(&mut self, now: Instant) {
        while let Ok(event) = self.events.try_recv() {
            for update in self.session.handle_event(event, now) {
                self.report(update);
            }
        }
        if self.session.poll_hints(now) {
            debug!("hints requested");
        }
        self.normalize_cursors();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.session.next_deadline()
    }

    pub fn identity(&self) -> &Identity {
        self.session.identity()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.session.context().snapshot()
    }

    pub fn groups(&self) -> &[CardGroup] {
        self.session.context().groups()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.snapshot()
            .map(|snapshot| {
                snapshot
                    .pending_by_table()
                    .into_iter()
                    .map(|(table, _)| table.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn pending_on(&self, table: &str) -> &[PendingCommitment] {
        self.snapshot()
            .and_then(|snapshot| snapshot.my_pending.get(table))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn group_row(&self, group: &CardGroup) -> String {
        let ctx = self.session.context();
        let selected = ctx.selection().selected_in(group, ctx.locked());
        let locked = group.locked_count(ctx.locked());
        let free = group.len() - locked;
        let mut row = format!("{:<4} x{}  {selected}/{free}", group.label, group.len());
        if locked > 0 {
            row.push_str(&format!("  [{locked} locked]"));
        }
        row
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        self.focus = match (self.focus, forward) {
            (FocusPane::Hand, true) => FocusPane::Tables,
            (FocusPane::Tables, true) => FocusPane::Round,
            (FocusPane::Round, true) => FocusPane::Events,
            (FocusPane::Events, true) => FocusPane::Hand,
            (FocusPane::Hand, false) => FocusPane::Events,
            (FocusPane::Tables, false) => FocusPane::Hand,
            (FocusPane::Round, false) => FocusPane::Tables,
            (FocusPane::Events, false) => FocusPane::Round,
        };
    }

    pub fn move_cursor(&mut self, down: bool) {
        match self.focus {
            FocusPane::Hand => {
                let len = self.groups().len();
                move_index(&mut self.hand_cursor, len, down);
            }
            FocusPane::Tables => {
                let len = self.table_names().len();
                move_index(&mut self.table_cursor, len, down);
            }
            FocusPane::Round | FocusPane::Events => {}
        }
    }

    pub fn toggle_focused(&mut self) {
        match self.focus {
            FocusPane::Hand => self.toggle_group_at_cursor(),
            FocusPane::Tables => self.choose_table_at_cursor(),
            FocusPane::Round | FocusPane::Events => {}
        }
    }

    pub fn activate_primary(&mut self) {
        match self.focus {
            FocusPane::Hand => self.toggle_group_at_cursor(),
            FocusPane::Tables => self.choose_table_at_cursor(),
            FocusPane::Round => self.perform(Action::ListSaves),
            FocusPane::Events => {}
        }
    }

    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
        self.push_status("selection cleared");
    }

    pub fn play_selected(&mut self) {
        let table = self.chosen_table.clone();
        self.perform(Action::PlaySelected { table });
    }

    /// Withdraws the most recent of this player's commitments on the table
    /// under the cursor when the Tables pane has focus, otherwise on the
    /// chosen table.
    pub fn withdraw_play(&mut self) {
        let under_cursor = self.table_names().get(self.table_cursor).cloned();
        let Some(table) = withdraw_table(self.focus, under_cursor, self.chosen_table.clone())
        else {
            self.push_status("no table to withdraw from");
            return;
        };
        let pid = self.identity().pid.clone();
        let latest = self
            .pending_on(&table)
            .iter()
            .filter(|commitment| commitment.belongs_to(&pid))
            .map(|commitment| commitment.placed_seq)
            .max();
        match latest {
            Some(placed_seq) => self.perform(Action::WithdrawPlay {
                table: Some(table),
                placed_seq,
            }),
            None => self.push_status(format!("nothing of yours on {table}")),
        }
    }

    pub fn perform(&mut self, action: Action) {
        match self.session.perform(&action) {
            Ok(()) => self.push_status(format!("sent {}", action.id())),
            Err(err) => self.push_action_error(&action, err),
        }
    }

    pub fn open_prompt(&mut self, mode: PromptMode) {
        self.prompt_mode = Some(mode);
        self.prompt_input.clear();
        self.push_status(format!("{}: type and press enter", mode.title()));
    }

    /// Consumes the key when a prompt is open.
    pub fn handle_prompt_key(&mut self, key: KeyEvent) -> bool {
        let Some(mode) = self.prompt_mode else {
            return false;
        };
        match key.code {
            KeyCode::Esc => {
                self.prompt_mode = None;
                self.prompt_input.clear();
                self.push_status("prompt cancelled");
            }
            KeyCode::Enter => {
                let input = std::mem::take(&mut self.prompt_input);
                self.prompt_mode = None;
                self.submit_prompt(mode, input.trim());
            }
            KeyCode::Backspace => {
                self.prompt_input.pop();
            }
            KeyCode::Char(ch) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    self.prompt_input.push(ch);
                }
            }
            _ => {}
        }
        true
    }

    fn submit_prompt(&mut self, mode: PromptMode, input: &str) {
        let action = match mode {
            PromptMode::ManualCard if input.is_empty() => {
                self.push_status("enter a card label");
                return;
            }
            PromptMode::LoadId | PromptMode::DeleteId if input.is_empty() => {
                self.push_status("enter a save id");
                return;
            }
            PromptMode::ManualCard => Action::AddManualCard {
                card: input.to_string(),
            },
            PromptMode::SaveName => Action::SaveCurrent {
                name: input.to_string(),
            },
            PromptMode::LoadId => Action::LoadSave {
                id: SaveId::parse(input),
            },
            PromptMode::DeleteId => Action::DeleteSave {
                id: SaveId::parse(input),
            },
        };
        self.perform(action);
    }

    pub fn report(&mut self, update: SessionUpdate) {
        let line = match update {
            SessionUpdate::Opened => "socket open; joining".to_string(),
            SessionUpdate::Joined { room } => {
                self.push_status(format!("joined {room}"));
                format!("joined room {room} as {}", self.identity().pid)
            }
            SessionUpdate::Snapshot { dropped } => {
                if dropped == 0 {
                    return;
                }
                format!("{dropped} selected card(s) left the hand")
            }
            SessionUpdate::Evaluation(result) => format!("eval: {}", result.summary()),
            SessionUpdate::Hints(result) => {
                self.push_status(format!("hints: {}", result.summary()));
                return;
            }
            SessionUpdate::RoundResolved(round) => format!("resolved {}", round_row(&round)),
            SessionUpdate::ServerError(message) => {
                self.push_status(format!("server: {message}"));
                format!("server error: {message}")
            }
            SessionUpdate::Saves(items) => format!("{} save(s) listed", items.len()),
            SessionUpdate::SaveDone => "room saved".to_string(),
            SessionUpdate::SaveDeleted => "save deleted".to_string(),
            SessionUpdate::SaveLoaded => "save loaded".to_string(),
            SessionUpdate::Malformed(detail) => format!("unreadable message: {detail}"),
            SessionUpdate::Disconnected { reason } => {
                self.push_status("disconnected (R to reconnect)");
                match reason {
                    Some(reason) => format!("disconnected: {reason}"),
                    None => "disconnected".to_string(),
                }
            }
        };
        self.push_event_line(line);
    }

    pub fn normalize_cursors(&mut self) {
        let groups = self.groups().len();
        let tables = self.table_names();
        clamp_index(&mut self.hand_cursor, groups);
        clamp_index(&mut self.table_cursor, tables.len());
        if let Some(chosen) = &self.chosen_table {
            if self.snapshot().is_some() && !tables.contains(chosen) {
                self.chosen_table = None;
            }
        }
    }

    pub fn push_status(&mut self, value: impl Into<String>) {
        self.status_line = value.into();
    }

    fn push_action_error(&mut self, action: &Action, err: SessionError) {
        debug!(action = action.id(), error = %err, "action rejected");
        self.status_line = format!("{}: {err}", action.id());
    }

    pub fn push_event_line(&mut self, line: String) {
        if self.event_log.len() >= MAX_EVENT_LOG {
            let _ = self.event_log.pop_front();
        }
        self.event_log.push_back(line);
    }

    fn toggle_group_at_cursor(&mut self) {
        let Some(label) = self
            .groups()
            .get(self.hand_cursor)
            .map(|group| group.label.clone())
        else {
            return;
        };
        match self.session.toggle_group(&label) {
            GroupToggle::Added(id) => self.push_status(format!("selected {label} {id}")),
            GroupToggle::Cleared(count) => {
                self.push_status(format!("cleared {count} from {label}"))
            }
            GroupToggle::Unchanged => self.push_status(format!("{label} is locked")),
        }
    }

    fn choose_table_at_cursor(&mut self) {
        if let Some(table) = self.table_names().get(self.table_cursor).cloned() {
            self.push_status(format!("table {table} chosen"));
            self.chosen_table = Some(table);
        }
    }
}

fn withdraw_table(
    focus: FocusPane,
    under_cursor: Option<String>,
    chosen: Option<String>,
) -> Option<String> {
    if focus == FocusPane::Tables {
        under_cursor.or(chosen)
    } else {
        chosen
    }
}

/// One table of a resolved round: winner label and how many plays it faced.
pub fn table_outcome_row(round: &RoundResult, table: &str) -> String {
    let plays = round
        .tables
        .iter()
        .find(|outcome| outcome.table == table)
        .map_or(0, |outcome| outcome.commitments().count());
    match round.winner_on(table) {
        Some(winner) => format!("{table}: {} of {plays}", winner.display_label()),
        None => format!("{table}: -"),
    }
}

pub fn round_row(round: &RoundResult) -> String {
    let tables: Vec<String> = round
        .tables
        .iter()
        .map(|outcome| table_outcome_row(round, &outcome.table))
        .collect();
    format!("R{} {}", round.round_no, tables.join(" | "))
}

fn move_index(value: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *value = 0;
        return;
    }
    if down {
        *value = (*value + 1) % len;
    } else if *value == 0 {
        *value = len - 1;
    } else {
        *value -= 1;
    }
}

fn clamp_index(value: &mut usize, len: usize) {
    if len == 0 {
        *value = 0;
    } else if *value >= len {
        *value = len - 1;
    }
}
