//! Background tasks module
//! 
//! This module contains the countdown tick source and the feedback tasks
//! that react to timer snapshots.

pub mod fanfare;
pub mod ticker;
pub mod wobble;

// Re-export main functions
pub use fanfare::{completion_edge, fanfare_task};
pub(crate) use ticker::run_ticker;
pub use wobble::{wobble_cadence, wobble_task};
