use crate::{
    build_command, find_group, group_hand, resolve_locked, Action, CardGroup, CardId,
    ClientMessage, EvalResult, GroupToggle, HintScheduler, HintsResult, LockedSet,
    RoundResult, SaveEntry, SelectionSet, ServerMessage, SessionError, Snapshot, TransportError,
};
use std::time::Instant;
use tracing::{debug, info, warn};

/// The socket underneath a session. Implementations deliver what happens on
/// the wire back to the session as [`TransportEvent`]s.
pub trait Transport {
    fn open(&mut self) -> Result<(), TransportError>;
    fn send(&mut self, text: String) -> Result<(), TransportError>;
    fn close(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Closed { reason: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub room: String,
    pub name: String,
    pub pid: String,
}

/// `Disconnected` is the state before the first connect; a torn-down session
/// ends in `Closed` rather than returning to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Disconnected,
    Connecting,
    Joined,
    /// Torn down. A session instance never leaves this phase.
    Closed,
}

impl SessionPhase {
    pub fn label(self) -> &'static str {
        match self {
            SessionPhase::Disconnected => "disconnected",
            SessionPhase::Connecting => "connecting",
            SessionPhase::Joined => "joined",
            SessionPhase::Closed => "closed",
        }
    }
}

/// What changed after feeding the session an event, for the front end to
/// report.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Opened,
    Joined { room: String },
    Snapshot { dropped: usize },
    Evaluation(EvalResult),
    Hints(HintsResult),
    RoundResolved(RoundResult),
    ServerError(String),
    Saves(Vec<SaveEntry>),
    SaveDone,
    SaveDeleted,
    SaveLoaded,
    Malformed(String),
    Disconnected { reason: Option<String> },
}

/// Everything the client knows between snapshots. Outlives a single session
/// instance so a reconnect keeps the user's selection.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    snapshot: Option<Snapshot>,
    locked: LockedSet,
    groups: Vec<CardGroup>,
    selection: SelectionSet,
    hints: HintScheduler,
    latest_hints: Option<HintsResult>,
    latest_eval: Option<EvalResult>,
    saves: Vec<SaveEntry>,
}

impl SessionContext {
    pub fn with_hints(hints: HintScheduler) -> Self {
        Self {
            hints,
            ..Self::default()
        }
    }

    /// Replaces the snapshot, then recomputes locks, regroups the hand,
    /// reconciles the selection and schedules a hints query, in that order.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot, local_pid: &str, now: Instant) -> usize {
        let snapshot = self.snapshot.insert(snapshot);
        self.locked = resolve_locked(snapshot, local_pid);
        let hand = snapshot.hand_of(local_pid);
        self.groups = group_hand(hand);
        let dropped = self.selection.reconcile(hand, &self.locked);
        self.hints.trigger(now);
        debug!(
            cards = hand.len(),
            groups = self.groups.len(),
            locked = self.locked.len(),
            selected = self.selection.len(),
            "snapshot applied"
        );
        dropped
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn groups(&self) -> &[CardGroup] {
        &self.groups
    }

    pub fn locked(&self) -> &LockedSet {
        &self.locked
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn current_selection(&self) -> Vec<CardId> {
        self.selection.current_selection(&self.locked)
    }

    pub fn toggle_group(&mut self, label: &str) -> GroupToggle {
        match find_group(&self.groups, label) {
            Some(group) => self.selection.toggle_group(group, &self.locked),
            None => GroupToggle::Unchanged,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn hints(&self) -> &HintScheduler {
        &self.hints
    }

    pub fn latest_hints(&self) -> Option<&HintsResult> {
        self.latest_hints.as_ref()
    }

    pub fn latest_eval(&self) -> Option<&EvalResult> {
        self.latest_eval.as_ref()
    }

    pub fn saves(&self) -> &[SaveEntry] {
        &self.saves
    }
}

/// One connection to a room. Owns the transport; every other component
/// reaches the wire through it.
pub struct Session<T: Transport> {
    identity: Identity,
    transport: T,
    phase: SessionPhase,
    transport_ready: bool,
    ctx: SessionContext,
}

impl<T: Transport> Session<T> {
    pub fn new(identity: Identity, transport: T) -> Self {
        Self::with_context(identity, transport, SessionContext::default())
    }

    pub fn with_context(identity: Identity, transport: T, ctx: SessionContext) -> Self {
        Self {
            identity,
            transport,
            phase: SessionPhase::Disconnected,
            transport_ready: false,
            ctx,
        }
    }

    pub fn into_context(self) -> SessionContext {
        self.ctx
    }

    /// Moves the context out so a replacement session can adopt it, leaving
    /// this instance closed with an empty context.
    pub fn take_context(&mut self) -> SessionContext {
        self.teardown();
        std::mem::take(&mut self.ctx)
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_joined(&self) -> bool {
        self.phase == SessionPhase::Joined && self.transport_ready
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn connect(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Disconnected {
            return Err(SessionError::InvalidTransition {
                action: "connect",
                phase: self.phase.label(),
            });
        }
        self.phase = SessionPhase::Connecting;
        info!(room = %self.identity.room, pid = %self.identity.pid, "connecting");
        if let Err(err) = self.transport.open() {
            warn!(error = %err, "transport failed to open");
            self.teardown();
            return Err(err.into());
        }
        Ok(())
    }

    /// Best-effort leave notice, then teardown.
    pub fn disconnect(&mut self) {
        if !matches!(self.phase, SessionPhase::Connecting | SessionPhase::Joined) {
            return;
        }
        if self.transport_ready {
            if let Err(err) = self.send(&ClientMessage::Leave) {
                debug!(error = %err, "leave notice not delivered");
            }
        }
        self.teardown();
    }

    pub fn handle_event(&mut self, event: TransportEvent, now: Instant) -> Vec<SessionUpdate> {
        if self.phase == SessionPhase::Closed {
            return Vec::new();
        }
        match event {
            TransportEvent::Opened => self.on_open(),
            TransportEvent::Message(text) => self.on_message(&text, now),
            TransportEvent::Closed { reason } => {
                info!(reason = reason.as_deref().unwrap_or("-"), "transport closed");
                self.teardown();
                vec![SessionUpdate::Disconnected { reason }]
            }
        }
    }

    /// Sends the debounced hints query once its quiet window has passed.
    /// Returns whether a request went out.
    pub fn poll_hints(&mut self, now: Instant) -> bool {
        if !self.ctx.hints.fire_due(now) {
            return false;
        }
        if !self.is_joined() {
            debug!("hints deadline passed while not joined; dropped");
            return false;
        }
        match self.send(&ClientMessage::Hints) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "hints request failed");
                false
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.ctx.hints.deadline()
    }

    pub fn toggle_group(&mut self, label: &str) -> GroupToggle {
        self.ctx.toggle_group(label)
    }

    pub fn clear_selection(&mut self) {
        self.ctx.clear_selection();
    }

    pub fn perform(&mut self, action: &Action) -> Result<(), SessionError> {
        let message = build_command(action, self.ctx.current_selection())?;
        if !self.is_joined() {
            return Err(SessionError::NotJoined);
        }
        self.send(&message)?;
        debug!(action = action.id(), "action sent");
        if action.consumes_selection() {
            self.ctx.clear_selection();
        }
        Ok(())
    }

    fn on_open(&mut self) -> Vec<SessionUpdate> {
        if self.phase != SessionPhase::Connecting {
            return Vec::new();
        }
        self.transport_ready = true;
        let join = ClientMessage::Join {
            room: self.identity.room.clone(),
            name: self.identity.name.clone(),
            pid: self.identity.pid.clone(),
        };
        match self.send(&join) {
            Ok(()) => vec![SessionUpdate::Opened],
            Err(err) => vec![SessionUpdate::Disconnected {
                reason: Some(err.to_string()),
            }],
        }
    }

    fn on_message(&mut self, text: &str, now: Instant) -> Vec<SessionUpdate> {
        let message = match ServerMessage::decode(text) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "malformed server message");
                return vec![SessionUpdate::Malformed(err.to_string())];
            }
        };
        let update = match message {
            ServerMessage::Joined { room } => {
                if self.phase != SessionPhase::Connecting {
                    return Vec::new();
                }
                self.phase = SessionPhase::Joined;
                info!(room = %room, "joined");
                self.ctx.hints.trigger(now);
                SessionUpdate::Joined { room }
            }
            // Also applied while Connecting: the server may push state before
            // its `joined` acknowledgement.
            ServerMessage::State { state } => {
                if self.phase == SessionPhase::Disconnected {
                    return Vec::new();
                }
                let dropped = self.ctx.apply_snapshot(state, &self.identity.pid, now);
                SessionUpdate::Snapshot { dropped }
            }
            ServerMessage::EvalResult(result) => {
                self.ctx.latest_eval = Some(result.clone());
                SessionUpdate::Evaluation(result)
            }
            ServerMessage::HintsResult(result) => {
                self.ctx.latest_hints = Some(result.clone());
                SessionUpdate::Hints(result)
            }
            ServerMessage::RoundResult { round } => SessionUpdate::RoundResolved(round),
            ServerMessage::Error { message } => SessionUpdate::ServerError(message),
            ServerMessage::SavesList { items } => {
                self.ctx.saves = items.clone();
                SessionUpdate::Saves(items)
            }
            ServerMessage::SaveDone => SessionUpdate::SaveDone,
            ServerMessage::SaveDeleted => SessionUpdate::SaveDeleted,
            ServerMessage::SaveLoaded => SessionUpdate::SaveLoaded,
            ServerMessage::Unknown => {
                debug!("ignoring unknown server message");
                return Vec::new();
            }
        };
        vec![update]
    }

    /// A failed send means the socket is gone; the session tears down.
    fn send(&mut self, message: &ClientMessage) -> Result<(), SessionError> {
        let text = message.encode()?;
        if let Err(err) = self.transport.send(text) {
            warn!(command = message.tag(), error = %err, "send failed");
            self.teardown();
            return Err(err.into());
        }
        Ok(())
    }

    fn teardown(&mut self) {
        if self.phase == SessionPhase::Closed {
            return;
        }
        self.transport.close();
        self.transport_ready = false;
        self.ctx.hints.cancel();
        self.phase = SessionPhase::Closed;
        info!("session closed");
    }
}
