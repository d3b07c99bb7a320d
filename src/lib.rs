//! EggHatch Timer - a single-session countdown with egg-hatching feedback
//! 
//! The library holds the countdown engine and its derived snapshot, the
//! sound service that renders feedback cues, the feedback tasks reacting to
//! snapshots, and an HTTP surface for driving it all.

pub mod config;
pub mod state;
pub mod api;
pub mod presets;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, TimerEngine, TimerSnapshot, Urgency};
pub use services::SoundService;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
