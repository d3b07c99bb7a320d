//! Speaker output through rodio

use std::{thread, time::Duration};
use rodio::{OutputStream, Sink, Source};
use tracing::debug;

use super::{
    sound::ToneOutput,
    synth::{CueSamples, SAMPLE_RATE},
    tones::{Cue, Tone},
};

impl Source for CueSamples {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.len())
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        CueSamples::sample_rate(self)
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.duration())
    }
}

/// Plays cues on the default output device
pub struct Speaker;

impl Speaker {
    /// Fails when the host has no default output device
    pub fn open() -> Result<Self, String> {
        OutputStream::try_default()
            .map(|_| Self)
            .map_err(|e| format!("No audio output device: {}", e))
    }
}

impl ToneOutput for Speaker {
    fn play(&mut self, cue: Cue, tones: &[Tone]) -> Result<(), String> {
        let samples = CueSamples::new(tones, SAMPLE_RATE);
        debug!("Rendering {} cue ({:?})", cue.name(), samples.duration());

        // The output stream is not Send, so it lives on the playback thread
        thread::Builder::new()
            .name(format!("cue-{}", cue.name()))
            .spawn(move || {
                let Ok((_stream, handle)) = OutputStream::try_default() else {
                    return;
                };
                let Ok(sink) = Sink::try_new(&handle) else {
                    return;
                };
                sink.append(samples);
                sink.sleep_until_end();
            })
            .map(|_| ())
            .map_err(|e| format!("Failed to spawn playback thread: {}", e))
    }
}
