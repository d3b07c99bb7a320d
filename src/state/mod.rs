//! State management module
//! 
//! This module contains the countdown state machine, its derived snapshot
//! and the application state shared with the HTTP handlers.

pub mod app_state;
pub mod snapshot;
pub mod timer_engine;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use snapshot::{FormattedTime, Phase, TimerSnapshot, Urgency};
pub use timer_engine::{StartOutcome, TimerEngine, ToggleOutcome, TICK_PERIOD};
pub use timer_state::{sanitize_seconds, TickOutcome, TimerState};
