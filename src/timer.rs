use std::time::{Duration, Instant};

use crate::{
    input::Transition,
    session::{Phase, SessionState},
};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

impl SessionState {
    /// One countdown tick. Ticks outside the running phase are stale and
    /// ignored, so a tick racing a last-word finish is harmless.
    pub fn on_tick(&mut self, now: Instant) -> Transition {
        if self.phase != Phase::Running {
            return Transition::Unchanged;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.finish(now);
            return Transition::Finished;
        }
        Transition::Changed
    }
}

/// Schedules fixed-period ticks from the moment it is armed.
///
/// Deadlines advance by whole periods, so keystrokes arriving between ticks
/// do not stretch the countdown.
#[derive(Clone, Copy, Debug)]
pub struct Countdown {
    period: Duration,
    next_tick: Option<Instant>,
}

impl Countdown {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_tick: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn arm(&mut self, now: Instant) {
        self.next_tick = Some(now + self.period);
    }

    pub fn disarm(&mut self) {
        self.next_tick = None;
    }

    /// Time left until the next tick; `None` while disarmed.
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        self.next_tick
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Consume one due tick, if any.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.next_tick {
            Some(deadline) if deadline <= now => {
                self.next_tick = Some(deadline + self.period);
                true
            }
            _ => false,
        }
    }

    /// Consume the pending tick regardless of the clock.
    pub fn advance(&mut self) {
        if let Some(deadline) = self.next_tick {
            self.next_tick = Some(deadline + self.period);
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}
