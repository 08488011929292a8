//! Per-player countdown.
//!
//! Remaining time is signed so an overrun shows how far past zero the player
//! went. The clock never ends a game itself; the orchestrator polls
//! `is_flagged` every tick.

use std::time::Duration;

const NANOS_PER_MS: i128 = 1_000_000;

/// Remaining time is kept in nanoseconds so sub-millisecond ticks add up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    remaining_nanos: i128,
}

impl Clock {
    pub fn new(starting_ms: u64) -> Self {
        Self {
            remaining_nanos: i128::from(starting_ms) * NANOS_PER_MS,
        }
    }

    /// Charge `elapsed` to this clock.
    pub fn tick(&mut self, elapsed: Duration) {
        let elapsed_nanos = i128::try_from(elapsed.as_nanos()).unwrap_or(i128::MAX);
        self.remaining_nanos = self.remaining_nanos.saturating_sub(elapsed_nanos);
    }

    pub fn add_increment(&mut self, increment_ms: u64) {
        self.remaining_nanos = self
            .remaining_nanos
            .saturating_add(i128::from(increment_ms) * NANOS_PER_MS);
    }

    /// Whole milliseconds left, rounded toward zero.
    #[inline]
    pub fn remaining_ms(&self) -> i64 {
        let ms = self.remaining_nanos / NANOS_PER_MS;
        i64::try_from(ms).unwrap_or(if ms < 0 { i64::MIN } else { i64::MAX })
    }

    /// Remaining time floored at zero, as handed to automated players.
    #[inline]
    pub fn remaining_ms_clamped(&self) -> u64 {
        self.remaining_ms().max(0) as u64
    }

    #[inline]
    pub fn is_flagged(&self) -> bool {
        self.remaining_nanos <= 0
    }
}
