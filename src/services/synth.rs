//! Square-wave rendering of cue recipes into mono PCM samples

use std::time::Duration;

use super::tones::Tone;

/// Sample rate used for speaker playback
pub const SAMPLE_RATE: u32 = 44_100;

/// Fade-in applied to every note to avoid clicks
const ATTACK_SECS: f64 = 0.005;

/// Mono `f32` samples of one cue. Overlapping notes are mixed and the
/// result is clamped to `-1.0..=1.0`.
#[derive(Debug, Clone)]
pub struct CueSamples {
    tones: Vec<Tone>,
    sample_rate: u32,
    position: u64,
    total: u64,
    total_ms: u64,
}

impl CueSamples {
    pub fn new(tones: &[Tone], sample_rate: u32) -> Self {
        let total_ms = tones
            .iter()
            .map(|tone| tone.delay_ms + tone.duration_ms)
            .max()
            .unwrap_or(0);
        Self {
            tones: tones.to_vec(),
            sample_rate,
            position: 0,
            total: total_ms * u64::from(sample_rate) / 1000,
            total_ms,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of the whole cue, from the first note starting to the last
    /// note ending
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.total_ms)
    }

    fn sample_at(&self, index: u64) -> f32 {
        let t = index as f64 / f64::from(self.sample_rate);
        let mixed: f64 = self.tones.iter().map(|tone| tone_level(tone, t)).sum();
        mixed.clamp(-1.0, 1.0) as f32
    }
}

/// Level of one note at `t` seconds into the cue
fn tone_level(tone: &Tone, t: f64) -> f64 {
    let length = tone.duration_ms as f64 / 1000.0;
    let local = t - tone.delay_ms as f64 / 1000.0;
    if local < 0.0 || local >= length {
        return 0.0;
    }

    // Phase in cycles of a linear chirp from `from` to `to` over `length`
    let from = f64::from(tone.frequency_hz);
    let to = tone.sweep_to_hz.map(f64::from).unwrap_or(from);
    let cycles = from * local + (to - from) * local * local / (2.0 * length);
    let square = if cycles.fract() < 0.5 { 1.0 } else { -1.0 };

    let attack = (local / ATTACK_SECS).min(1.0);
    let release = 1.0 - local / length;
    f64::from(tone.volume) * attack * release * square
}

impl Iterator for CueSamples {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.position >= self.total {
            return None;
        }
        let sample = self.sample_at(self.position);
        self.position += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.total - self.position) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for CueSamples {}
