//! Process-level helpers
//!
//! Currently only graceful shutdown on SIGTERM/SIGINT.

pub mod signals;

pub use signals::shutdown_signal;
