use cardroom_core::{
    Action, ActionError, CardId, ClientMessage, GroupToggle, HintScheduler, Identity, SaveId,
    Session, SessionContext, SessionError, SessionPhase, SessionUpdate, Transport, TransportError,
    TransportEvent,
};
use serde_json::json;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct RecordingTransport {
    opened: bool,
    closed: bool,
    fail_sends: bool,
    sent: Vec<String>,
}

impl Transport for RecordingTransport {
    fn open(&mut self) -> Result<(), TransportError> {
        self.opened = true;
        Ok(())
    }

    fn send(&mut self, text: String) -> Result<(), TransportError> {
        if self.fail_sends {
            return Err(TransportError::Closed);
        }
        self.sent.push(text);
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

fn identity() -> Identity {
    Identity {
        room: "demo".to_string(),
        name: "Tigers".to_string(),
        pid: "p-1".to_string(),
    }
}

fn sent(session: &Session<RecordingTransport>) -> Vec<ClientMessage> {
    session
        .transport()
        .sent
        .iter()
        .map(|text| serde_json::from_str(text).expect("client message"))
        .collect()
}

fn sent_tags(session: &Session<RecordingTransport>) -> Vec<&'static str> {
    sent(session).iter().map(ClientMessage::tag).collect()
}

fn state_message(hand: serde_json::Value, pending: serde_json::Value) -> TransportEvent {
    let frame = json!({
        "type": "state",
        "state": {
            "players": [
                {"pid": "p-1", "name": "Tigers", "hand": hand},
                {"pid": "p-2", "name": "Wolves", "hand": [{"id": 50, "label": "2♠"}]}
            ],
            "tables": ["T1", "T2"],
            "my_pending": pending,
            "active_count": 2,
            "ready_count": 0,
            "you_ready": false
        }
    });
    TransportEvent::Message(frame.to_string())
}

fn joined_session(now: Instant) -> Session<RecordingTransport> {
    let mut session = Session::new(identity(), RecordingTransport::default());
    session.connect().expect("connect");
    session.handle_event(TransportEvent::Opened, now);
    session.handle_event(
        TransportEvent::Message(json!({"type": "joined", "room": "demo"}).to_string()),
        now,
    );
    session
}

fn selected(session: &Session<RecordingTransport>) -> Vec<u64> {
    session
        .context()
        .selection()
        .iter()
        .map(|id| id.0)
        .collect()
}

#[test]
fn open_sends_join_with_identity() {
    let now = Instant::now();
    let mut session = Session::new(identity(), RecordingTransport::default());
    assert_eq!(session.phase(), SessionPhase::Disconnected);
    session.connect().expect("connect");
    assert!(session.transport().opened);
    assert_eq!(session.phase(), SessionPhase::Connecting);

    let updates = session.handle_event(TransportEvent::Opened, now);
    assert_eq!(updates, vec![SessionUpdate::Opened]);
    assert_eq!(
        sent(&session),
        vec![ClientMessage::Join {
            room: "demo".to_string(),
            name: "Tigers".to_string(),
            pid: "p-1".to_string(),
        }]
    );

    let updates = session.handle_event(
        TransportEvent::Message(json!({"type": "joined", "room": "demo"}).to_string()),
        now,
    );
    assert_eq!(
        updates,
        vec![SessionUpdate::Joined {
            room: "demo".to_string()
        }]
    );
    assert_eq!(session.phase(), SessionPhase::Joined);
}

#[test]
fn state_before_joined_is_applied_without_sending_hints() {
    let now = Instant::now();
    let mut idle = Session::new(identity(), RecordingTransport::default());
    let ignored = idle.handle_event(state_message(json!([{"id": 1, "label": "7♣"}]), json!({})), now);
    assert!(ignored.is_empty());
    assert!(idle.context().snapshot().is_none());

    let mut session = Session::new(identity(), RecordingTransport::default());
    session.connect().expect("connect");
    session.handle_event(TransportEvent::Opened, now);
    let updates = session.handle_event(
        state_message(json!([{"id": 1, "label": "7♣"}, {"id": 2, "label": "7♣"}]), json!({})),
        now,
    );
    assert_eq!(updates, vec![SessionUpdate::Snapshot { dropped: 0 }]);
    assert_eq!(session.phase(), SessionPhase::Connecting);
    assert_eq!(session.context().groups().len(), 1);

    assert!(!session.poll_hints(now + Duration::from_secs(1)));
    assert_eq!(sent_tags(&session), vec!["join"]);
}

#[test]
fn connect_is_only_valid_once() {
    let mut session = Session::new(identity(), RecordingTransport::default());
    session.connect().expect("connect");
    let err = session.connect().expect_err("second connect");
    assert!(matches!(err, SessionError::InvalidTransition { .. }));
    session.disconnect();
    assert_eq!(session.phase(), SessionPhase::Closed);
    assert!(session.connect().is_err());
}

#[test]
fn join_schedules_one_hints_request() {
    let now = Instant::now();
    let mut session = joined_session(now);
    assert!(!session.poll_hints(now + Duration::from_millis(50)));
    assert!(session.poll_hints(now + Duration::from_millis(100)));
    assert!(!session.poll_hints(now + Duration::from_millis(400)));
    assert_eq!(sent_tags(&session), vec!["join", "hints"]);
}

#[test]
fn snapshot_burst_yields_a_single_hints_request() {
    let start = Instant::now();
    let mut session = joined_session(start);
    for step in 0..6u64 {
        let at = start + Duration::from_millis(step * 40);
        session.handle_event(state_message(json!([{"id": 1, "label": "7♣"}]), json!({})), at);
        assert!(!session.poll_hints(at));
    }
    let last = start + Duration::from_millis(200);
    assert_eq!(session.next_deadline(), Some(last + Duration::from_millis(100)));
    assert!(!session.poll_hints(last + Duration::from_millis(99)));
    assert!(session.poll_hints(last + Duration::from_millis(100)));
    assert_eq!(sent_tags(&session), vec!["join", "hints"]);
}

#[test]
fn clicking_groups_selects_individual_instances() {
    let now = Instant::now();
    let mut session = joined_session(now);
    session.handle_event(
        state_message(
            json!([
                {"id": 1, "label": "7♣"},
                {"id": 2, "label": "7♣"},
                {"id": 3, "label": "K♠"}
            ]),
            json!({}),
        ),
        now,
    );
    let labels: Vec<&str> = session
        .context()
        .groups()
        .iter()
        .map(|group| group.label.as_str())
        .collect();
    assert_eq!(labels, vec!["7♣", "K♠"]);

    session.toggle_group("7♣");
    assert_eq!(selected(&session), vec![1]);
    session.toggle_group("7♣");
    assert_eq!(selected(&session), vec![1, 2]);
    session.toggle_group("K♠");
    assert_eq!(selected(&session), vec![1, 2, 3]);
    session.toggle_group("7♣");
    assert_eq!(selected(&session), vec![3]);
}

#[test]
fn snapshot_reconciles_against_hand_and_locks() {
    let now = Instant::now();
    let mut session = joined_session(now);
    session.handle_event(
        state_message(
            json!([
                {"id": 1, "label": "7♣"},
                {"id": 2, "label": "7♣"},
                {"id": 3, "label": "K♠"},
                {"id": 4, "label": "A♦"}
            ]),
            json!({}),
        ),
        now,
    );
    for label in ["7♣", "7♣", "K♠", "A♦"] {
        session.toggle_group(label);
    }
    assert_eq!(selected(&session), vec![1, 2, 3, 4]);

    let updates = session.handle_event(
        state_message(
            json!([
                {"id": 2, "label": "7♣"},
                {"id": 3, "label": "K♠"},
                {"id": 4, "label": "A♦"}
            ]),
            json!({"T1": [{"card_ids": [3], "label": "High card", "placed_seq": 4}], "T2": []}),
        ),
        now,
    );
    assert_eq!(updates, vec![SessionUpdate::Snapshot { dropped: 2 }]);
    assert_eq!(selected(&session), vec![2, 4]);
    assert!(session.context().locked().contains(&CardId(3)));
    assert_eq!(session.toggle_group("K♠"), GroupToggle::Unchanged);
}

#[test]
fn play_requires_a_table() {
    let now = Instant::now();
    let mut session = joined_session(now);
    session.handle_event(state_message(json!([{"id": 1, "label": "7♣"}]), json!({})), now);

    for table in [None, Some("".to_string()), Some("   ".to_string())] {
        let err = session
            .perform(&Action::PlaySelected { table })
            .expect_err("no table");
        assert_eq!(err, SessionError::Action(ActionError::MissingTable));
    }
    session.toggle_group("7♣");
    let err = session
        .perform(&Action::PlaySelected { table: None })
        .expect_err("no table");
    assert_eq!(err, SessionError::Action(ActionError::MissingTable));
    assert_eq!(sent_tags(&session), vec!["join"]);
    assert_eq!(selected(&session), vec![1]);
}

#[test]
fn consuming_actions_clear_the_selection_once_sent() {
    let now = Instant::now();
    let mut session = joined_session(now);
    session.handle_event(
        state_message(
            json!([{"id": 1, "label": "7♣"}, {"id": 2, "label": "7♣"}, {"id": 3, "label": "9♦"}]),
            json!({}),
        ),
        now,
    );
    session.toggle_group("7♣");
    session.toggle_group("7♣");

    session
        .perform(&Action::EvaluateSelected)
        .expect("evaluate");
    assert_eq!(selected(&session), vec![1, 2]);

    session
        .perform(&Action::PlaySelected {
            table: Some("T2".to_string()),
        })
        .expect("play");
    assert!(session.context().selection().is_empty());

    session.toggle_group("9♦");
    session.perform(&Action::RemoveSelected).expect("remove");
    assert!(session.context().selection().is_empty());

    let messages = sent(&session);
    assert_eq!(
        messages[1..],
        [
            ClientMessage::EvalSelected {
                card_ids: vec![CardId(1), CardId(2)]
            },
            ClientMessage::PlaySelected {
                card_ids: vec![CardId(1), CardId(2)],
                table: "T2".to_string()
            },
            ClientMessage::RemoveSelected {
                card_ids: vec![CardId(3)]
            },
        ]
    );
}

#[test]
fn parameter_actions_map_onto_commands() {
    let now = Instant::now();
    let mut session = joined_session(now);
    let actions = [
        Action::DealToSelf { count: 8 },
        Action::DealToAll { count: 3 },
        Action::ClearHand,
        Action::AddManualCard {
            card: " Q♥ ".to_string(),
        },
        Action::AddUnknownCard,
        Action::EndRoundVote,
        Action::EndRoundForce,
        Action::ListSaves,
        Action::SaveCurrent {
            name: "friday".to_string(),
        },
        Action::LoadSave {
            id: SaveId::parse("4"),
        },
        Action::DeleteSave {
            id: SaveId::parse("old"),
        },
        Action::WithdrawPlay {
            table: Some("T1".to_string()),
            placed_seq: 12,
        },
    ];
    for action in &actions {
        session.perform(action).expect("send");
    }
    let messages = sent(&session);
    assert_eq!(messages[1], ClientMessage::Deal { n: 8 });
    assert_eq!(messages[2], ClientMessage::DealAll { n: 3 });
    assert_eq!(
        messages[4],
        ClientMessage::AddManual {
            card: "Q♥".to_string()
        }
    );
    assert_eq!(messages[10], ClientMessage::LoadSave { id: SaveId::Number(4) });
    assert_eq!(
        messages[12],
        ClientMessage::RemovePlay {
            table: "T1".to_string(),
            placed_seq: 12
        }
    );
    assert_eq!(messages.len(), actions.len() + 1);
}

#[test]
fn actions_before_join_are_rejected_locally() {
    let mut session = Session::new(identity(), RecordingTransport::default());
    assert_eq!(
        session.perform(&Action::EndRoundVote),
        Err(SessionError::NotJoined)
    );
    session.connect().expect("connect");
    session.handle_event(TransportEvent::Opened, Instant::now());
    assert_eq!(
        session.perform(&Action::ClearHand),
        Err(SessionError::NotJoined)
    );
    assert_eq!(sent_tags(&session), vec!["join"]);
}

#[test]
fn disconnect_sends_leave_and_keeps_the_selection() {
    let now = Instant::now();
    let mut session = joined_session(now);
    session.handle_event(state_message(json!([{"id": 1, "label": "7♣"}]), json!({})), now);
    session.toggle_group("7♣");

    session.disconnect();
    assert_eq!(session.phase(), SessionPhase::Closed);
    assert!(session.transport().closed);
    assert_eq!(sent_tags(&session), vec!["join", "leave"]);
    assert!(!session.poll_hints(now + Duration::from_secs(1)));

    let ctx = session.into_context();
    assert_eq!(ctx.selection().len(), 1);
    let mut next = Session::with_context(identity(), RecordingTransport::default(), ctx);
    assert_eq!(next.phase(), SessionPhase::Disconnected);
    next.connect().expect("reconnect");
    assert_eq!(selected(&next), vec![1]);
}

#[test]
fn take_context_leaves_an_empty_closed_session() {
    let now = Instant::now();
    let mut session = joined_session(now);
    session.handle_event(state_message(json!([{"id": 4, "label": "Q♦"}]), json!({})), now);
    session.toggle_group("Q♦");

    let ctx = session.take_context();
    assert_eq!(session.phase(), SessionPhase::Closed);
    assert!(session.transport().closed);
    assert!(session.context().selection().is_empty());
    assert_eq!(ctx.selection().len(), 1);
    assert!(ctx.snapshot().is_some());
}

#[test]
fn remote_close_tears_down_without_retry() {
    let now = Instant::now();
    let mut session = joined_session(now);
    session.handle_event(state_message(json!([{"id": 1, "label": "7♣"}]), json!({})), now);
    session.toggle_group("7♣");

    let updates = session.handle_event(
        TransportEvent::Closed {
            reason: Some("reset".to_string()),
        },
        now,
    );
    assert_eq!(
        updates,
        vec![SessionUpdate::Disconnected {
            reason: Some("reset".to_string())
        }]
    );
    assert_eq!(session.phase(), SessionPhase::Closed);
    assert!(session.transport().closed);
    assert_eq!(selected(&session), vec![1]);
    assert!(session
        .handle_event(state_message(json!([]), json!({})), now)
        .is_empty());
    assert_eq!(selected(&session), vec![1]);
    assert!(!session.poll_hints(now + Duration::from_secs(1)));
}

#[test]
fn send_failure_forces_teardown() {
    let now = Instant::now();
    let mut failing = Session::with_context(
        identity(),
        RecordingTransport {
            fail_sends: true,
            ..RecordingTransport::default()
        },
        SessionContext::default(),
    );
    failing.connect().expect("connect");
    let updates = failing.handle_event(TransportEvent::Opened, now);
    assert!(matches!(updates[..], [SessionUpdate::Disconnected { .. }]));
    assert_eq!(failing.phase(), SessionPhase::Closed);
    assert!(failing.transport().closed);
    assert_eq!(
        failing.perform(&Action::EndRoundVote),
        Err(SessionError::NotJoined)
    );
}

#[test]
fn unknown_and_malformed_messages() {
    let now = Instant::now();
    let mut session = joined_session(now);
    let updates = session.handle_event(
        TransportEvent::Message(json!({"type": "sparkles", "n": 1}).to_string()),
        now,
    );
    assert!(updates.is_empty());
    let updates = session.handle_event(TransportEvent::Message("{not json".to_string()), now);
    assert!(matches!(updates[..], [SessionUpdate::Malformed(_)]));
    assert_eq!(session.phase(), SessionPhase::Joined);
}

#[test]
fn results_are_kept_as_latest_views() {
    let now = Instant::now();
    let mut session = joined_session(now);
    session.handle_event(
        TransportEvent::Message(
            json!({"type": "hints_result", "pairs": [["7♣", "7♦"]], "trips": [], "quads": [],
                   "straights5": [], "flushes5": [], "count": 1})
            .to_string(),
        ),
        now,
    );
    session.handle_event(
        TransportEvent::Message(
            json!({"type": "saves_list", "items": [{"id": 3, "name": "lunch"}]}).to_string(),
        ),
        now,
    );
    let updates = session.handle_event(
        TransportEvent::Message(json!({"type": "error", "message": "Need 2-5 cards"}).to_string()),
        now,
    );
    assert_eq!(
        updates,
        vec![SessionUpdate::ServerError("Need 2-5 cards".to_string())]
    );
    let hints = session.context().latest_hints().expect("hints");
    assert_eq!(hints.pairs.len(), 1);
    assert_eq!(session.context().saves()[0].name, "lunch");
}

#[test]
fn custom_quiet_window_is_respected() {
    let now = Instant::now();
    let ctx = SessionContext::with_hints(HintScheduler::new(Duration::from_millis(10)));
    let mut session = Session::with_context(identity(), RecordingTransport::default(), ctx);
    session.connect().expect("connect");
    session.handle_event(TransportEvent::Opened, now);
    session.handle_event(
        TransportEvent::Message(json!({"type": "joined"}).to_string()),
        now,
    );
    assert!(session.poll_hints(now + Duration::from_millis(10)));
}
