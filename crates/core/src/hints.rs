use std::time::{Duration, Instant};

pub const HINT_QUIET_WINDOW: Duration = Duration::from_millis(100);

/// Single-shot debounce timer for the `hints` query. A trigger replaces any
/// pending deadline; nothing is queued behind it.
#[derive(Debug, Clone)]
pub struct HintScheduler {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Default for HintScheduler {
    fn default() -> Self {
        Self::new(HINT_QUIET_WINDOW)
    }
}

impl HintScheduler {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once per burst, when `now` has reached the deadline. The timer is
    /// disarmed as it fires.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
