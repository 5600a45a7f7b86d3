//! Host-owned pacing for stepped sessions
//!
//! A [`Cadence`] only remembers when the next tick is due. It never runs
//! anything itself; the host loop asks [`Cadence::next_tick`] how long it may
//! sleep and calls [`Cadence::fire`] when it wakes up.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    interval: Duration,
    next_tick: Option<Instant>,
}

impl Cadence {
    /// A cancelled cadence with the given interval
    pub fn new(interval: Duration) -> Self {
        Cadence {
            interval,
            next_tick: None,
        }
    }

    /// Schedule the first tick one interval after `now`
    pub fn arm(&mut self, now: Instant) {
        self.next_tick = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next_tick = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the interval; an armed cadence is rescheduled from `now`
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        if self.is_armed() {
            self.arm(now);
        }
    }

    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Consume a due tick, scheduling the next one
    ///
    /// Returns `false` when cancelled or not yet due. Missed ticks are not
    /// replayed: the next tick is always one interval after `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.next_tick {
            Some(due) if now >= due => {
                self.next_tick = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
