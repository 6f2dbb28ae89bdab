//! Held-key auto-repeat for left, right and soft drop.
//!
//! DAS (Delayed Auto-Shift): delay before movement starts repeating when you hold a key.
//! ARR (Auto-Repeat Rate): time between repeated moves while holding.
//! One shared repeat timer serves all held directions; it starts once some key has been
//! held past the delay and stops when every direction is released.

use crate::timing::IntervalTimer;
use std::time::{Duration, Instant};

pub const DEFAULT_REPEAT_DELAY_MS: u64 = 170;
pub const DEFAULT_REPEAT_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    pub const ALL: [Self; 3] = [Self::Left, Self::Right, Self::Down];

    fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Down => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RepeatScheduler {
    held: [bool; 3],
    /// Per-key DAS deadline armed on the key-down edge.
    delay_until: [Option<Instant>; 3],
    delay: Duration,
    repeat: IntervalTimer,
}

impl Default for RepeatScheduler {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_REPEAT_DELAY_MS),
            Duration::from_millis(DEFAULT_REPEAT_INTERVAL_MS),
        )
    }
}

impl RepeatScheduler {
    pub fn new(delay: Duration, interval: Duration) -> Self {
        Self {
            held: [false; 3],
            delay_until: [None; 3],
            delay,
            repeat: IntervalTimer::new(interval),
        }
    }

    #[cfg(test)]
    pub fn is_held(&self, dir: Direction) -> bool {
        self.held[dir.index()]
    }

    #[cfg(test)]
    pub fn is_repeating(&self) -> bool {
        self.repeat.is_running()
    }

    /// Key-down. Returns true on the down edge, when the caller performs the immediate move;
    /// further presses while held (terminal key repeat) are ignored.
    pub fn press(&mut self, dir: Direction, now: Instant) -> bool {
        let i = dir.index();
        if self.held[i] {
            return false;
        }
        self.held[i] = true;
        self.delay_until[i] = Some(now + self.delay);
        true
    }

    /// Key-up. The repeat timer is cancelled once no direction is held.
    pub fn release(&mut self, dir: Direction) {
        let i = dir.index();
        self.held[i] = false;
        self.delay_until[i] = None;
        if !self.held.iter().any(|&h| h) {
            self.repeat.cancel();
        }
    }

    /// Forget all held keys and stop repeating (new game, piece locked, pause).
    pub fn cancel_all(&mut self) {
        self.held = [false; 3];
        self.delay_until = [None; 3];
        self.repeat.cancel();
    }

    /// Advance to `now`. Returns the directions to move this tick, in left/right/down order.
    pub fn tick(&mut self, now: Instant) -> Vec<Direction> {
        for dir in Direction::ALL {
            let i = dir.index();
            if self.delay_until[i].is_some_and(|t| now >= t) {
                self.delay_until[i] = None;
                if self.held[i] && !self.repeat.is_running() {
                    self.repeat.start(now);
                }
            }
        }
        if !self.repeat.poll(now) {
            return Vec::new();
        }
        Direction::ALL
            .into_iter()
            .filter(|d| self.held[d.index()])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn press_edge_only_once() {
        let t0 = Instant::now();
        let mut r = RepeatScheduler::default();
        assert!(r.press(Direction::Left, t0));
        assert!(!r.press(Direction::Left, t0 + ms(30)));
        assert!(r.is_held(Direction::Left));
    }

    #[test]
    fn no_repeat_before_delay() {
        let t0 = Instant::now();
        let mut r = RepeatScheduler::default();
        r.press(Direction::Right, t0);
        assert!(r.tick(t0 + ms(100)).is_empty());
        assert!(r.tick(t0 + ms(169)).is_empty());
        assert!(!r.is_repeating());
    }

    #[test]
    fn repeats_after_delay_at_interval() {
        let t0 = Instant::now();
        let mut r = RepeatScheduler::default();
        r.press(Direction::Right, t0);
        assert!(r.tick(t0 + ms(170)).is_empty());
        assert!(r.is_repeating());
        assert_eq!(r.tick(t0 + ms(220)), vec![Direction::Right]);
        assert!(r.tick(t0 + ms(240)).is_empty());
        assert_eq!(r.tick(t0 + ms(270)), vec![Direction::Right]);
    }

    #[test]
    fn repeat_moves_every_held_key() {
        let t0 = Instant::now();
        let mut r = RepeatScheduler::default();
        r.press(Direction::Left, t0);
        r.press(Direction::Down, t0 + ms(10));
        r.tick(t0 + ms(170));
        assert_eq!(r.tick(t0 + ms(220)), vec![Direction::Left, Direction::Down]);
    }

    #[test]
    fn quick_tap_never_repeats() {
        let t0 = Instant::now();
        let mut r = RepeatScheduler::default();
        r.press(Direction::Left, t0);
        r.release(Direction::Left);
        assert!(r.tick(t0 + ms(200)).is_empty());
        assert!(r.tick(t0 + ms(400)).is_empty());
        assert!(!r.is_repeating());
    }

    #[test]
    fn releasing_all_keys_cancels_repeat() {
        let t0 = Instant::now();
        let mut r = RepeatScheduler::default();
        r.press(Direction::Left, t0);
        r.press(Direction::Down, t0);
        r.tick(t0 + ms(170));
        r.release(Direction::Left);
        assert!(r.is_repeating());
        assert_eq!(r.tick(t0 + ms(220)), vec![Direction::Down]);
        r.release(Direction::Down);
        assert!(!r.is_repeating());
        assert!(r.tick(t0 + ms(270)).is_empty());
    }

    #[test]
    fn cancel_all_forgets_held_keys() {
        let t0 = Instant::now();
        let mut r = RepeatScheduler::default();
        r.press(Direction::Right, t0);
        r.tick(t0 + ms(170));
        r.cancel_all();
        assert!(!r.is_held(Direction::Right));
        assert!(r.tick(t0 + ms(300)).is_empty());
        assert!(r.press(Direction::Right, t0 + ms(310)));
    }
}
