//! Chiptune cue recipes
//!
//! Each cue is a short list of square-wave tones. Output devices decide how
//! (or whether) to render them.

use serde::Serialize;

use crate::state::Urgency;

/// One square-wave note
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tone {
    pub frequency_hz: f32,
    /// Linear sweep target, if the pitch slides
    pub sweep_to_hz: Option<f32>,
    pub duration_ms: u64,
    /// Peak gain in `0.0..=1.0`
    pub volume: f32,
    /// Offset from the start of the cue
    pub delay_ms: u64,
}

impl Tone {
    const fn note(frequency_hz: f32, duration_ms: u64, volume: f32) -> Self {
        Self {
            frequency_hz,
            sweep_to_hz: None,
            duration_ms,
            volume,
            delay_ms: 0,
        }
    }

    const fn sweep(from_hz: f32, to_hz: f32, duration_ms: u64, volume: f32) -> Self {
        Self {
            frequency_hz: from_hz,
            sweep_to_hz: Some(to_hz),
            duration_ms,
            volume,
            delay_ms: 0,
        }
    }

    const fn after(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

const C5: f32 = 523.25;
const E5: f32 = 659.25;
const G5: f32 = 783.99;
const C6: f32 = 1046.50;

/// Named feedback event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cue {
    /// Short confirmation click
    Beep,
    Start,
    Pause,
    Reset,
    Select,
    Wobble(Urgency),
    /// Completion fanfare
    Hatch,
}

impl Cue {
    pub fn name(&self) -> &'static str {
        match self {
            Cue::Beep => "beep",
            Cue::Start => "start",
            Cue::Pause => "pause",
            Cue::Reset => "reset",
            Cue::Select => "select",
            Cue::Wobble(_) => "wobble",
            Cue::Hatch => "hatch",
        }
    }

    /// Notes that make up this cue, ordered by start offset
    pub fn tones(&self) -> Vec<Tone> {
        match self {
            Cue::Beep => vec![Tone::note(880.0, 80, 0.2)],
            Cue::Start => vec![Tone::sweep(330.0, 660.0, 150, 0.2)],
            Cue::Pause => vec![Tone::sweep(440.0, 220.0, 200, 0.15)],
            Cue::Reset => vec![
                Tone::note(330.0, 50, 0.15),
                Tone::note(220.0, 100, 0.15).after(60),
            ],
            Cue::Select => vec![Tone::note(660.0, 50, 0.15)],
            Cue::Wobble(_) => vec![Tone::sweep(200.0, 250.0, 150, 0.1)],
            Cue::Hatch => {
                let mut tones: Vec<Tone> = [C5, E5, G5, C6]
                    .iter()
                    .enumerate()
                    .map(|(i, &freq)| Tone::note(freq, 150, 0.25).after(i as u64 * 100))
                    .collect();
                tones.push(Tone::note(C6, 400, 0.2).after(450));
                tones
            }
        }
    }
}
