//! Derived views of the countdown state
//!
//! Nothing here is stored. Every field is recomputed from a [`TimerState`]
//! whenever a snapshot is taken.

use serde::{Deserialize, Serialize};

use super::TimerState;

/// Coarse bucket of remaining time, ordered from calm to done
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
    Complete,
}

impl Urgency {
    /// Classify remaining seconds. Thresholds are inclusive upper bounds,
    /// checked from the smallest up.
    pub fn from_remaining(remaining_seconds: u64) -> Self {
        match remaining_seconds {
            0 => Urgency::Complete,
            1..=5 => Urgency::Critical,
            6..=15 => Urgency::High,
            16..=30 => Urgency::Medium,
            _ => Urgency::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
            Urgency::Complete => "complete",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named lifecycle phase, derived from the raw flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Stopped with time left
    Idle,
    Running,
    /// Countdown ran out while running
    Complete,
    /// No time set (e.g. after `set_time(0)`), nothing to start
    Empty,
}

impl Phase {
    pub fn of(state: &TimerState) -> Self {
        if state.running {
            Phase::Running
        } else if state.complete {
            Phase::Complete
        } else if state.remaining_seconds == 0 {
            Phase::Empty
        } else {
            Phase::Idle
        }
    }
}

/// Zero-padded clock face
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedTime {
    pub minutes: String,
    pub seconds: String,
    pub display: String,
}

impl FormattedTime {
    pub fn from_seconds(total_seconds: u64) -> Self {
        let minutes = format!("{:02}", total_seconds / 60);
        let seconds = format!("{:02}", total_seconds % 60);
        let display = format!("{}:{}", minutes, seconds);
        Self { minutes, seconds, display }
    }
}

/// Percentage of the initial duration already elapsed, in `0.0..=100.0`
pub fn progress_percent(state: &TimerState) -> f64 {
    if state.initial_seconds == 0 {
        return 0.0;
    }
    let elapsed = state.initial_seconds.saturating_sub(state.remaining_seconds) as f64;
    (elapsed / state.initial_seconds as f64 * 100.0).clamp(0.0, 100.0)
}

/// Everything a consumer can observe after a committed transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub remaining_seconds: u64,
    pub initial_seconds: u64,
    pub running: bool,
    pub complete: bool,
    pub formatted: FormattedTime,
    pub progress: f64,
    pub urgency: Urgency,
    pub can_start: bool,
    pub phase: Phase,
}

impl TimerSnapshot {
    pub fn of(state: &TimerState) -> Self {
        Self {
            remaining_seconds: state.remaining_seconds,
            initial_seconds: state.initial_seconds,
            running: state.running,
            complete: state.complete,
            formatted: FormattedTime::from_seconds(state.remaining_seconds),
            progress: progress_percent(state),
            urgency: Urgency::from_remaining(state.remaining_seconds),
            can_start: state.can_start(),
            phase: Phase::of(state),
        }
    }

    /// Progress as a fraction in `0.0..=1.0`
    pub fn progress_fraction(&self) -> f64 {
        self.progress / 100.0
    }
}
