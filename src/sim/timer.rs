//! Countdown timer
//!
//! Timers are measured against the world clock (seconds since the session
//! began) rather than ticked individually, so a timer nobody looks at costs
//! nothing and can never drift.

use serde::{Deserialize, Serialize};

/// Restartable countdown
///
/// A timer that was never started is *not* finished: cooldowns that should
/// be ready immediately are started with a zero duration instead.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Timer {
    /// Clock time at which the countdown ends, `None` until first started
    end: Option<f64>,
}

impl Timer {
    /// A timer that has never been started
    pub const fn idle() -> Self {
        Self { end: None }
    }

    /// A timer already counting down from `now`
    pub fn started(now: f64, duration: f32) -> Self {
        let mut timer = Self::idle();
        timer.start(now, duration);
        timer
    }

    /// (Re)start the countdown
    pub fn start(&mut self, now: f64, duration: f32) {
        self.end = Some(now + f64::from(duration.max(0.0)));
    }

    /// Forget the countdown (back to never-started)
    pub fn stop(&mut self) {
        self.end = None;
    }

    pub fn is_started(&self) -> bool {
        self.end.is_some()
    }

    /// True once started and the clock has reached the end
    pub fn finished(&self, now: f64) -> bool {
        match self.end {
            Some(end) => now >= end,
            None => false,
        }
    }

    /// Seconds left, zero when finished or idle
    pub fn remaining(&self, now: f64) -> f32 {
        match self.end {
            Some(end) => (end - now).max(0.0) as f32,
            None => 0.0,
        }
    }
}
