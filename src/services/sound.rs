//! Sound service: the process-wide feedback channel
//!
//! One `SoundService` is created per process and shared by the HTTP handlers
//! and the feedback tasks. The output device is opened lazily on the first
//! cue (or an explicit `init`). If it cannot be opened, or a playback fails,
//! sound quietly degrades for the rest of the session.

use std::{
    io::{IsTerminal, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};
use clap::ValueEnum;
use tracing::{debug, info, warn};

use super::{
    synth::{CueSamples, SAMPLE_RATE},
    tones::{Cue, Tone},
};
use crate::state::Urgency;

/// Something that can render a cue
pub trait ToneOutput: Send {
    fn play(&mut self, cue: Cue, tones: &[Tone]) -> Result<(), String>;
}

/// Opens the output device on demand
pub type DeviceOpener = Box<dyn Fn() -> Result<Box<dyn ToneOutput>, String> + Send + Sync>;

/// Output backend selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AudioBackend {
    /// Ring the terminal bell on stderr
    Bell,
    /// Describe each cue in the log
    Log,
    /// Square waves on the default output device (`speaker` feature)
    Speaker,
    /// Silent
    #[value(name = "none")]
    Silent,
}

/// Rings the terminal bell once per cue
pub struct TerminalBell {
    out: std::io::Stderr,
}

impl TerminalBell {
    pub fn open() -> Result<Self, String> {
        let out = std::io::stderr();
        if !out.is_terminal() {
            return Err("stderr is not a terminal".to_string());
        }
        Ok(Self { out })
    }
}

impl ToneOutput for TerminalBell {
    fn play(&mut self, _cue: Cue, _tones: &[Tone]) -> Result<(), String> {
        self.out
            .write_all(b"\x07")
            .and_then(|_| self.out.flush())
            .map_err(|e| format!("Failed to ring terminal bell: {}", e))
    }
}

/// Writes each cue to the tracing log
pub struct LogOutput;

impl ToneOutput for LogOutput {
    fn play(&mut self, cue: Cue, tones: &[Tone]) -> Result<(), String> {
        let notes: Vec<String> = tones
            .iter()
            .map(|tone| match tone.sweep_to_hz {
                Some(to) => {
                    format!("{:.0}->{:.0}Hz/{}ms", tone.frequency_hz, to, tone.duration_ms)
                }
                None => format!("{:.0}Hz/{}ms", tone.frequency_hz, tone.duration_ms),
            })
            .collect();
        let length = CueSamples::new(tones, SAMPLE_RATE).duration();
        info!("♪ {} {:?} [{}]", cue.name(), length, notes.join(", "));
        Ok(())
    }
}

/// Output that discards everything
pub struct NullOutput;

impl ToneOutput for NullOutput {
    fn play(&mut self, _cue: Cue, _tones: &[Tone]) -> Result<(), String> {
        Ok(())
    }
}

/// Keeps every cue it is asked to play; cloned handles share the list
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    played: Arc<Mutex<Vec<Cue>>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<Cue> {
        self.played.lock().map(|cues| cues.clone()).unwrap_or_default()
    }

    /// Opener that hands out a handle sharing this recording
    pub fn opener(&self) -> DeviceOpener {
        let recording = self.clone();
        Box::new(move || Ok::<_, String>(Box::new(recording.clone()) as Box<dyn ToneOutput>))
    }
}

impl ToneOutput for RecordingOutput {
    fn play(&mut self, cue: Cue, _tones: &[Tone]) -> Result<(), String> {
        self.played
            .lock()
            .map_err(|e| format!("Failed to lock recording: {}", e))?
            .push(cue);
        Ok(())
    }
}

#[cfg(feature = "speaker")]
fn speaker_opener() -> DeviceOpener {
    Box::new(|| super::speaker::Speaker::open().map(|s| Box::new(s) as Box<dyn ToneOutput>))
}

#[cfg(not(feature = "speaker"))]
fn speaker_opener() -> DeviceOpener {
    Box::new(|| {
        Err::<Box<dyn ToneOutput>, _>("built without the `speaker` feature".to_string())
    })
}

enum DeviceSlot {
    Closed,
    Open(Box<dyn ToneOutput>),
    /// Opening or playing failed; stays silent until torn down
    Unavailable,
}

/// Process-scoped sound feedback
pub struct SoundService {
    enabled: AtomicBool,
    device: Mutex<DeviceSlot>,
    opener: DeviceOpener,
}

impl std::fmt::Debug for SoundService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundService")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

impl SoundService {
    pub fn new(opener: DeviceOpener, enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            device: Mutex::new(DeviceSlot::Closed),
            opener,
        }
    }

    pub fn from_backend(backend: AudioBackend, enabled: bool) -> Self {
        let opener: DeviceOpener = match backend {
            AudioBackend::Bell => Box::new(|| {
                TerminalBell::open().map(|bell| Box::new(bell) as Box<dyn ToneOutput>)
            }),
            AudioBackend::Log => {
                Box::new(|| Ok::<_, String>(Box::new(LogOutput) as Box<dyn ToneOutput>))
            }
            AudioBackend::Speaker => speaker_opener(),
            AudioBackend::Silent => {
                Box::new(|| Ok::<_, String>(Box::new(NullOutput) as Box<dyn ToneOutput>))
            }
        };
        Self::new(opener, enabled)
    }

    pub fn set_enabled(&self, enabled: bool) {
        info!("Sound {}", if enabled { "enabled" } else { "disabled" });
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Open the output device now rather than on the first cue.
    /// Returns whether a device is available.
    pub fn init(&self) -> bool {
        match self.device.lock() {
            Ok(mut slot) => self.ensure_open(&mut slot),
            Err(e) => {
                warn!("Failed to lock sound device: {}", e);
                false
            }
        }
    }

    /// Close the output device. A later cue reopens it.
    pub fn teardown(&self) {
        if let Ok(mut slot) = self.device.lock() {
            if matches!(*slot, DeviceSlot::Open(_)) {
                debug!("Closing sound device");
            }
            *slot = DeviceSlot::Closed;
        }
    }

    fn ensure_open(&self, slot: &mut DeviceSlot) -> bool {
        if let DeviceSlot::Closed = slot {
            *slot = match (self.opener)() {
                Ok(device) => {
                    debug!("Sound device opened");
                    DeviceSlot::Open(device)
                }
                Err(e) => {
                    warn!("Sound device unavailable, continuing silently: {}", e);
                    DeviceSlot::Unavailable
                }
            };
        }
        matches!(slot, DeviceSlot::Open(_))
    }

    /// Play a cue. No-op when muted or when no device is available.
    pub fn play(&self, cue: Cue) {
        if !self.is_enabled() {
            return;
        }

        let mut slot = match self.device.lock() {
            Ok(slot) => slot,
            Err(e) => {
                warn!("Failed to lock sound device: {}", e);
                return;
            }
        };
        if !self.ensure_open(&mut slot) {
            return;
        }

        if let DeviceSlot::Open(device) = &mut *slot {
            debug!("Playing {} cue", cue.name());
            if let Err(e) = device.play(cue, &cue.tones()) {
                warn!("Sound playback failed, disabling device: {}", e);
                *slot = DeviceSlot::Unavailable;
            }
        }
    }

    pub fn on_start(&self) {
        self.play(Cue::Start);
    }

    pub fn on_pause(&self) {
        self.play(Cue::Pause);
    }

    pub fn on_reset(&self) {
        self.play(Cue::Reset);
    }

    pub fn on_select(&self) {
        self.play(Cue::Select);
    }

    pub fn on_beep(&self) {
        self.play(Cue::Beep);
    }

    pub fn on_wobble(&self, urgency: Urgency) {
        self.play(Cue::Wobble(urgency));
    }

    pub fn on_complete(&self) {
        self.play(Cue::Hatch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Broken;

    impl ToneOutput for Broken {
        fn play(&mut self, _cue: Cue, _tones: &[Tone]) -> Result<(), String> {
            Err("device unplugged".to_string())
        }
    }

    #[test]
    fn muted_service_plays_nothing() {
        let recording = RecordingOutput::new();
        let sound = SoundService::new(recording.opener(), false);

        sound.on_start();
        sound.on_complete();
        assert!(recording.played().is_empty());

        sound.set_enabled(true);
        sound.on_select();
        assert_eq!(recording.played(), vec![Cue::Select]);
    }

    #[test]
    fn device_opens_lazily_once() {
        let opened = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&opened);
        let sound = SoundService::new(
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(Box::new(NullOutput) as Box<dyn ToneOutput>)
            }),
            true,
        );

        assert_eq!(opened.load(Ordering::SeqCst), 0);
        sound.on_beep();
        sound.on_reset();
        assert_eq!(opened.load(Ordering::SeqCst), 1);

        sound.teardown();
        sound.on_beep();
        assert_eq!(opened.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unavailable_device_degrades_silently() {
        let sound = SoundService::new(
            Box::new(|| Err::<Box<dyn ToneOutput>, _>("no audio hardware".to_string())),
            true,
        );
        assert!(!sound.init());
        sound.on_complete();
        assert!(sound.is_enabled());
    }

    #[test]
    fn failing_playback_disables_device() {
        let opened = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&opened);
        let sound = SoundService::new(
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(Box::new(Broken) as Box<dyn ToneOutput>)
            }),
            true,
        );

        sound.on_start();
        sound.on_pause();
        // Not reopened after the failure
        assert_eq!(opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn event_helpers_map_to_cues() {
        let recording = RecordingOutput::new();
        let sound = SoundService::new(recording.opener(), true);

        sound.on_wobble(Urgency::Critical);
        sound.on_complete();
        assert_eq!(recording.played(), vec![Cue::Wobble(Urgency::Critical), Cue::Hatch]);
    }

    #[cfg(not(feature = "speaker"))]
    #[test]
    fn speaker_without_feature_degrades_to_silence() {
        let sound = SoundService::from_backend(AudioBackend::Speaker, true);
        assert!(!sound.init());
        sound.on_start();
        assert!(sound.is_enabled());
    }

    #[test]
    fn silent_and_log_backends_always_open() {
        assert!(SoundService::from_backend(AudioBackend::Silent, true).init());
        assert!(SoundService::from_backend(AudioBackend::Log, true).init());
    }
}
