//! Feedback service module
//! 
//! This module contains the sound service and the chiptune cue recipes it
//! plays.

pub mod sound;
#[cfg(feature = "speaker")]
pub mod speaker;
pub mod synth;
pub mod tones;

// Re-export main types
pub use sound::{
    AudioBackend, DeviceOpener, NullOutput, RecordingOutput, SoundService, ToneOutput,
};
pub use synth::{CueSamples, SAMPLE_RATE};
pub use tones::{Cue, Tone};
