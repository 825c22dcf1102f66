use crate::app::{round_row, table_outcome_row, App, FocusPane};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Line, Modifier, Style, Stylize};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

const HISTORY_ROWS: usize = 5;

pub fn draw(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(12),
            Constraint::Length(10),
        ])
        .split(frame.area());

    draw_header(frame, root[0], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(root[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Min(8)])
        .split(middle[1]);

    draw_hand(frame, middle[0], app);
    draw_tables(frame, right[0], app);
    draw_round(frame, right[1], app);
    draw_events(frame, root[2], app);

    if app.show_help {
        draw_help_popup(frame);
    }
    if app.prompt_mode.is_some() {
        draw_prompt(frame, app);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let identity = app.identity();
    let phase = app.session.phase().label();
    let title = format!(
        "Cardroom | {} as {} ({}) | {}",
        identity.room, identity.name, identity.pid, phase
    );
    let summary = match app.snapshot() {
        Some(snapshot) => format!(
            "Round {}  players {}  ready {}/{}{}  pending {}  selected {}",
            snapshot.round_no,
            snapshot.players.len(),
            snapshot.ready_count,
            snapshot.active_count,
            if snapshot.you_ready { " (you)" } else { "" },
            snapshot.pending_count(),
            app.session.context().current_selection().len(),
        ),
        None => "waiting for room state".to_string(),
    };
    let table = format!(
        "Focus: {} | Table: {} | Deal {}",
        app.focus.label(),
        app.chosen_table.as_deref().unwrap_or("-"),
        app.deal_count
    );
    let lines = vec![
        Line::from(title.bold()),
        Line::from(summary),
        Line::from(table),
        Line::from(format!("Status: {}", app.status_line)),
    ];
    let block = Block::default().borders(Borders::ALL).title("Overview");
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_hand(frame: &mut Frame, area: Rect, app: &App) {
    let groups = app.groups();
    let items: Vec<ListItem<'_>> = if groups.is_empty() {
        vec![ListItem::new("empty")]
    } else {
        groups
            .iter()
            .map(|group| ListItem::new(app.group_row(group)))
            .collect()
    };
    let block = pane_block("Hand", app.focus == FocusPane::Hand);
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    let mut state = ListState::default();
    if !groups.is_empty() {
        state.select(Some(app.hand_cursor.min(groups.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_tables(frame: &mut Frame, area: Rect, app: &App) {
    let tables = app.table_names();
    let pid = &app.identity().pid;
    let items: Vec<ListItem<'_>> = if tables.is_empty() {
        vec![ListItem::new("no tables")]
    } else {
        tables
            .iter()
            .map(|table| {
                let marker = if app.chosen_table.as_deref() == Some(table.as_str()) {
                    "*"
                } else {
                    " "
                };
                let plays: Vec<String> = app
                    .pending_on(table)
                    .iter()
                    .filter(|commitment| commitment.belongs_to(pid))
                    .map(|commitment| {
                        format!("#{} {}", commitment.placed_seq, commitment.display_label())
                    })
                    .collect();
                let plays = if plays.is_empty() {
                    "-".to_string()
                } else {
                    plays.join(" | ")
                };
                ListItem::new(format!("{marker} {table:<8} {plays}"))
            })
            .collect()
    };
    let block = pane_block("Tables", app.focus == FocusPane::Tables);
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !tables.is_empty() {
        state.select(Some(app.table_cursor.min(tables.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_round(frame: &mut Frame, area: Rect, app: &App) {
    let ctx = app.session.context();
    let mut lines = Vec::new();
    match ctx.snapshot().and_then(|snapshot| snapshot.last_round.as_ref()) {
        Some(round) => {
            lines.push(Line::from(format!("Last round {}", round.round_no).bold()));
            for outcome in &round.tables {
                lines.push(Line::from(format!(
                    "  {}",
                    table_outcome_row(round, &outcome.table)
                )));
            }
        }
        None => lines.push(Line::from("No round resolved yet")),
    }
    if let Some(snapshot) = ctx.snapshot() {
        let last_no = snapshot.last_round.as_ref().map(|round| round.round_no);
        let mut earlier = snapshot
            .history()
            .filter(|round| Some(round.round_no) != last_no)
            .take(HISTORY_ROWS)
            .peekable();
        if earlier.peek().is_some() {
            lines.push(Line::from("History:"));
        }
        for round in earlier {
            lines.push(Line::from(format!("  {}", round_row(round))));
        }
    }
    if let Some(snapshot) = ctx.snapshot() {
        lines.push(Line::from(format!(
            "Ready {}/{}{}",
            snapshot.ready_count,
            snapshot.active_count,
            if snapshot.you_ready { ", you voted" } else { "" }
        )));
        let opponents: Vec<String> = snapshot
            .opponents(&app.identity().pid)
            .map(|player| format!("{} ({})", player.display_name(), player.hand.len()))
            .collect();
        if !opponents.is_empty() {
            lines.push(Line::from(format!("Opponents: {}", opponents.join(", "))));
        }
    }
    if let Some(eval) = ctx.latest_eval() {
        lines.push(Line::from(format!("Eval: {}", eval.summary())));
    }
    if let Some(hints) = ctx.latest_hints() {
        lines.push(Line::from(format!("Hints: {}", hints.summary())));
    }
    if !ctx.saves().is_empty() {
        lines.push(Line::from("Saves:"));
        for entry in ctx.saves() {
            let name = if entry.name.is_empty() {
                "(unnamed)"
            } else {
                entry.name.as_str()
            };
            lines.push(Line::from(format!("  [{}] {}", entry.id, name)));
        }
    }
    let block = pane_block("Round", app.focus == FocusPane::Round);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_events(frame: &mut Frame, area: Rect, app: &App) {
    let capacity = area.height.saturating_sub(2) as usize;
    let start = app.event_log.len().saturating_sub(capacity);
    let lines: Vec<Line<'_>> = app
        .event_log
        .iter()
        .skip(start)
        .map(|line| Line::from(line.clone()))
        .collect();
    let block = pane_block("Events", app.focus == FocusPane::Events);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help_popup(frame: &mut Frame) {
    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from("q quit | ? help | tab focus | arrows/jk move"),
        Line::from("space: hand toggles group, tables choose table"),
        Line::from("enter: hand toggles group, tables choose table, round lists saves"),
        Line::from("esc clear selection | R reconnect"),
        Line::from("d deal | D deal all | C clear hand | x remove selected"),
        Line::from("e eval | p play on chosen table | w withdraw last play"),
        Line::from("a add card | u add unknown | v vote end | F force end"),
        Line::from("l list saves | S save | L load | X delete"),
    ];
    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_prompt(frame: &mut Frame, app: &App) {
    let Some(mode) = app.prompt_mode else {
        return;
    };
    let area = centered_rect(60, 24, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from("Enter=submit  Esc=cancel"),
        Line::from(mode.hint()),
        Line::from(""),
        Line::from(format!("> {}", app.prompt_input)),
    ];
    let block = Block::default()
        .title(mode.title())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let mut block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }
    block
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
