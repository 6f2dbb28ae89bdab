//! Cancellable periodic timer polled from the main loop.
//!
//! Time is passed in explicitly, so the loop drives it with `Instant::now()` and
//! tests drive it with a virtual clock (`start + Duration`).

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTimer {
    period: Duration,
    next_fire: Option<Instant>,
}

impl IntervalTimer {
    /// A stopped timer.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_fire: None,
        }
    }

    #[cfg(test)]
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.next_fire.is_some()
    }

    /// (Re)arm: first fire one period after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_fire = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_fire = None;
    }

    /// Change the period and restart the phase from `now` if running.
    pub fn restart_with(&mut self, period: Duration, now: Instant) {
        self.period = period;
        if self.is_running() {
            self.start(now);
        }
    }

    /// True at most once per call when a deadline has passed. A late poll does not
    /// accumulate a burst of fires; the next deadline is pushed past `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_fire else {
            return false;
        };
        if now < due {
            return false;
        }
        let mut next = due + self.period;
        if next <= now {
            next = now + self.period;
        }
        self.next_fire = Some(next);
        true
    }

    /// Time left until the next fire, if running.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_fire.map(|t| t.saturating_duration_since(now))
    }
}
