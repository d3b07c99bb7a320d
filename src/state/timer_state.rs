//! Countdown state structure and its transitions
//!
//! `TimerState` holds only the four raw fields. Everything a consumer renders
//! (formatted clock, progress, urgency) is projected from them on demand in
//! [`super::snapshot`]. The async tick source lives in `TimerEngine`; this
//! type only knows what a command or a tick does to the numbers.

use serde::{Deserialize, Serialize};

/// Clamp a user-supplied duration to a non-negative whole number of seconds.
///
/// Fractions are floored. Negative, NaN and infinite inputs collapse to zero.
pub fn sanitize_seconds(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    seconds.floor() as u64
}

/// Raw countdown state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub remaining_seconds: u64,
    pub initial_seconds: u64,
    pub running: bool,
    pub complete: bool,
}

/// Result of applying one tick to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time was decremented and the countdown continues
    Counting,
    /// This tick exhausted the countdown; the timer is now complete
    Completed,
    /// The state was not running, nothing changed
    Ignored,
}

impl TimerState {
    /// Create an idle state seeded with a sanitized duration
    pub fn new(seed_seconds: f64) -> Self {
        let seed = sanitize_seconds(seed_seconds);
        Self {
            remaining_seconds: seed,
            initial_seconds: seed,
            running: false,
            complete: false,
        }
    }

    /// Replace both the initial and remaining duration and return to idle
    pub fn set_time(&mut self, seconds: f64) -> u64 {
        let sanitized = sanitize_seconds(seconds);
        self.running = false;
        self.complete = false;
        self.remaining_seconds = sanitized;
        self.initial_seconds = sanitized;
        sanitized
    }

    /// Whether there is any time left to count down
    pub fn can_start(&self) -> bool {
        self.remaining_seconds > 0
    }

    /// Mark the state running. Returns false, leaving the state untouched,
    /// when no time remains.
    pub fn begin(&mut self) -> bool {
        if !self.can_start() {
            return false;
        }
        self.complete = false;
        self.running = true;
        true
    }

    /// Stop counting without touching the remaining time or completion flag
    pub fn halt(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    /// Restore the last duration set and clear completion
    pub fn reset(&mut self) {
        self.running = false;
        self.complete = false;
        self.remaining_seconds = self.initial_seconds;
    }

    /// Apply a single one-second tick.
    ///
    /// Reaching zero stops the countdown and marks it complete in the same
    /// mutation, so no observer ever sees `remaining == 0` while running.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Ignored;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.running = false;
            self.complete = true;
            TickOutcome::Completed
        } else {
            TickOutcome::Counting
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariants(state: &TimerState) {
        assert!(
            !(state.running && state.complete),
            "running and complete at once: {:?}",
            state
        );
        if state.remaining_seconds == 0 {
            assert!(!state.running, "running with no time left: {:?}", state);
        }
        if state.complete {
            assert_eq!(state.remaining_seconds, 0);
        }
    }

    #[test]
    fn sanitize_floors_and_clamps() {
        assert_eq!(sanitize_seconds(90.9), 90);
        assert_eq!(sanitize_seconds(0.4), 0);
        assert_eq!(sanitize_seconds(-3.0), 0);
        assert_eq!(sanitize_seconds(f64::NAN), 0);
        assert_eq!(sanitize_seconds(f64::NEG_INFINITY), 0);
        assert_eq!(sanitize_seconds(f64::INFINITY), 0);
    }

    #[test]
    fn seed_is_sanitized() {
        let state = TimerState::new(-12.5);
        assert_eq!(state.remaining_seconds, 0);
        assert_eq!(state.initial_seconds, 0);
        assert!(!state.can_start());
    }

    #[test]
    fn begin_refuses_without_time() {
        let mut state = TimerState::new(0.0);
        let before = state;
        assert!(!state.begin());
        assert_eq!(state, before);
    }

    #[test]
    fn countdown_completes_exactly_once() {
        let mut state = TimerState::new(3.0);
        assert!(state.begin());

        assert_eq!(state.tick(), TickOutcome::Counting);
        assert_eq!(state.tick(), TickOutcome::Counting);
        assert_eq!(state.tick(), TickOutcome::Completed);
        assert_invariants(&state);
        assert!(state.complete);
        assert!(!state.running);

        // Further ticks are inert once stopped
        assert_eq!(state.tick(), TickOutcome::Ignored);
        assert_eq!(state.remaining_seconds, 0);
    }

    #[test]
    fn halt_keeps_remaining_and_completion() {
        let mut state = TimerState::new(10.0);
        state.begin();
        state.tick();
        assert!(state.halt());
        assert_eq!(state.remaining_seconds, 9);
        assert!(!state.complete);
        assert!(!state.halt());
    }

    #[test]
    fn set_time_to_zero_is_not_completion() {
        let mut state = TimerState::new(10.0);
        state.begin();
        state.set_time(0.0);
        assert!(!state.complete);
        assert!(!state.running);
        assert_invariants(&state);
    }

    #[test]
    fn set_time_may_lower_initial_below_old_remaining() {
        let mut state = TimerState::new(300.0);
        state.set_time(30.0);
        assert_eq!(state.remaining_seconds, 30);
        assert_eq!(state.initial_seconds, 30);
    }

    #[test]
    fn reset_after_completion_restores_initial() {
        let mut state = TimerState::new(2.0);
        state.begin();
        state.tick();
        state.tick();
        assert!(state.complete);

        state.reset();
        assert_eq!(state.remaining_seconds, 2);
        assert!(!state.complete);
        assert!(state.can_start());
    }
}
