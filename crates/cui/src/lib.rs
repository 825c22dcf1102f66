mod actions;
mod app;
pub mod config;
mod input;
pub mod persistence;
pub mod telemetry;
mod view;

use anyhow::{Context, Result};
use app::App;
use cardroom_core::Identity;
use cardroom_net::endpoint_url;
use config::{parse_options, LaunchOptions};
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, ExecutableCommand};
use persistence::{default_identity_path, resolve_pid};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, stdout, IsTerminal};
use std::time::{Duration, Instant};
use tracing::info;

const TICK_RATE: Duration = Duration::from_millis(120);
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

pub fn run(options: LaunchOptions) -> Result<()> {
    telemetry::initialise(&options.log_file).context("initialise logging")?;
    let endpoint = endpoint_url(&options.server).context("resolve server endpoint")?;
    let identity_path = default_identity_path();
    let resolved = resolve_pid(options.pid.as_deref(), identity_path.as_deref());
    let identity = Identity {
        room: options.room.clone(),
        name: options.name.clone().unwrap_or_else(|| resolved.pid.clone()),
        pid: resolved.pid,
    };
    info!(endpoint = %endpoint, room = %identity.room, pid = %identity.pid, "starting client");

    ensure_interactive_terminal()?;

    let mut app = App::new(&options, identity, endpoint);
    if let Some(note) = resolved.note {
        app.push_event_line(note);
    }

    enable_raw_mode().map_err(|err| {
        anyhow::anyhow!(
            "failed to enable raw mode; ensure the process owns an interactive terminal: {err}"
        )
    })?;
    let mut stdout = stdout();
    stdout
        .execute(EnterAlternateScreen)
        .context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    app.start();
    let run_result = run_loop(&mut terminal, &mut app);
    app.shutdown(SHUTDOWN_GRACE);
    restore_terminal(&mut terminal)?;
    run_result
}

pub fn run_with_args(args: &[String]) -> Result<()> {
    run(parse_options(args))
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        app.on_tick(Instant::now());
        terminal.draw(|frame| view::draw(frame, app))?;
        if event::poll(poll_timeout(app.next_deadline(), Instant::now()))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.handle_prompt_key(key) {
                    continue;
                }
                let action = input::map_key(key);
                actions::dispatch(app, action);
            }
        }
    }
    Ok(())
}

/// Wakes no later than the pending hints deadline.
fn poll_timeout(deadline: Option<Instant>, now: Instant) -> Duration {
    match deadline {
        Some(deadline) => deadline.saturating_duration_since(now).min(TICK_RATE),
        None => TICK_RATE,
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("leave alternate screen")?;
    terminal.show_cursor().context("show cursor")?;
    Ok(())
}

fn ensure_interactive_terminal() -> Result<()> {
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        return Ok(());
    }
    anyhow::bail!(
        "cardroom requires an interactive TTY (run directly in a terminal, not a piped/headless shell)"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_timeout_caps_at_tick_rate() {
        let now = Instant::now();
        assert_eq!(poll_timeout(None, now), TICK_RATE);
        assert_eq!(poll_timeout(Some(now + Duration::from_secs(5)), now), TICK_RATE);
    }

    #[test]
    fn poll_timeout_wakes_for_hints_deadline() {
        let now = Instant::now();
        let deadline = now + Duration::from_millis(40);
        assert_eq!(poll_timeout(Some(deadline), now), Duration::from_millis(40));
        assert_eq!(poll_timeout(Some(now), now + Duration::from_millis(5)), Duration::ZERO);
    }
}
