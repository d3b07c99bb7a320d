//! Main application state management

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::info;

use super::{StartOutcome, TimerEngine, TimerSnapshot, ToggleOutcome};
use crate::{presets::Preset, services::SoundService};

/// Outcome of selecting a preset from the presentation layer
#[derive(Debug, Clone)]
pub enum PresetSelection {
    Applied(TimerSnapshot),
    /// Presets are locked while the countdown runs
    Locked(TimerSnapshot),
}

/// Everything the presentation layer needs: the engine, the sound service
/// and a little bookkeeping about the session
#[derive(Debug)]
pub struct AppState {
    pub engine: TimerEngine,
    pub sound: Arc<SoundService>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    pub selected_preset: Arc<Mutex<Option<String>>>,
    audio_primed: AtomicBool,
}

impl AppState {
    pub fn new(
        engine: TimerEngine,
        sound: Arc<SoundService>,
        port: u16,
        host: String,
        selected_preset: Option<String>,
    ) -> Self {
        Self {
            engine,
            sound,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            selected_preset: Arc::new(Mutex::new(selected_preset)),
            audio_primed: AtomicBool::new(false),
        }
    }

    /// The first user command opens the sound device, so the first cue
    /// does not pay for it
    fn prime_audio(&self) {
        if !self.audio_primed.swap(true, Ordering::SeqCst) {
            let available = self.sound.init();
            info!("Sound device {}", if available { "ready" } else { "unavailable" });
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// START button: begins the countdown, restarting from the initial
    /// duration if the last run completed. Returns whether it is running.
    pub fn press_start(&self) -> Result<(bool, TimerSnapshot), String> {
        self.prime_audio();
        let outcome = self.engine.start_fresh()?;
        if outcome == StartOutcome::Started {
            self.sound.on_start();
        }
        self.record_action("start");
        Ok((outcome != StartOutcome::Refused, self.engine.snapshot()))
    }

    /// PAUSE button. Returns whether the timer was running.
    pub fn press_pause(&self) -> Result<(bool, TimerSnapshot), String> {
        self.prime_audio();
        let was_running = self.engine.pause()?;
        if was_running {
            self.sound.on_pause();
        }
        self.record_action("pause");
        Ok((was_running, self.engine.snapshot()))
    }

    /// Combined START/PAUSE button
    pub fn press_toggle(&self) -> Result<(ToggleOutcome, TimerSnapshot), String> {
        self.prime_audio();
        let outcome = self.engine.toggle_fresh()?;
        match outcome {
            ToggleOutcome::Started => self.sound.on_start(),
            ToggleOutcome::Paused => self.sound.on_pause(),
            ToggleOutcome::Refused => {}
        }
        self.record_action("toggle");
        Ok((outcome, self.engine.snapshot()))
    }

    /// RESET button
    pub fn press_reset(&self) -> Result<TimerSnapshot, String> {
        self.prime_audio();
        self.sound.on_reset();
        let snapshot = self.engine.reset()?;
        self.record_action("reset");
        Ok(snapshot)
    }

    /// Set an arbitrary duration
    pub fn set_time(&self, seconds: f64) -> Result<TimerSnapshot, String> {
        self.prime_audio();
        let snapshot = self.engine.set_time(seconds)?;
        if let Ok(mut selected) = self.selected_preset.lock() {
            *selected = None;
        }
        self.record_action("set-time");
        Ok(snapshot)
    }

    /// Apply a preset unless the countdown is running
    pub fn select_preset(&self, preset: &Preset) -> Result<PresetSelection, String> {
        self.prime_audio();
        let current = self.engine.snapshot();
        if current.running {
            info!("Preset {} ignored while running", preset.id);
            return Ok(PresetSelection::Locked(current));
        }

        self.sound.on_select();
        let snapshot = self.engine.set_time(preset.seconds as f64)?;
        if let Ok(mut selected) = self.selected_preset.lock() {
            *selected = Some(preset.id.to_string());
        }
        info!("Preset {} selected ({})", preset.id, preset.label_time());
        self.record_action(&format!("preset:{}", preset.id));
        Ok(PresetSelection::Applied(snapshot))
    }

    /// Toggle sound; turning it on confirms with a beep
    pub fn set_sound(&self, enabled: bool) {
        self.prime_audio();
        self.sound.set_enabled(enabled);
        if enabled {
            self.sound.on_beep();
        }
        self.record_action(if enabled { "sound-on" } else { "sound-off" });
    }

    pub fn get_selected_preset(&self) -> Option<String> {
        self.selected_preset.lock().ok().and_then(|s| s.clone())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Stop the countdown and release the sound device
    pub fn shutdown(&self) -> Result<(), String> {
        self.engine.shutdown()?;
        self.sound.teardown();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        presets,
        services::{Cue, NullOutput, RecordingOutput, ToneOutput},
    };
    use std::sync::atomic::AtomicUsize;

    fn app(seed: f64) -> (AppState, RecordingOutput) {
        let recording = RecordingOutput::new();
        let sound = Arc::new(SoundService::new(recording.opener(), true));
        let state = AppState::new(TimerEngine::new(seed), sound, 0, "127.0.0.1".to_string(), None);
        (state, recording)
    }

    #[tokio::test(start_paused = true)]
    async fn start_after_completion_restarts() {
        let (app, _) = app(1.0);
        app.press_start().unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        assert!(app.engine.snapshot().complete);

        let (started, snapshot) = app.press_start().unwrap();
        assert!(started);
        assert!(snapshot.running);
        assert_eq!(snapshot.remaining_seconds, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn presets_are_locked_while_running() {
        let (app, recording) = app(60.0);
        app.press_start().unwrap();

        let selection = app.select_preset(presets::find("rare").unwrap()).unwrap();
        assert!(matches!(selection, PresetSelection::Locked(s) if s.initial_seconds == 60));

        app.press_pause().unwrap();
        let selection = app.select_preset(presets::find("rare").unwrap()).unwrap();
        assert!(matches!(selection, PresetSelection::Applied(s) if s.remaining_seconds == 300));
        assert_eq!(app.get_selected_preset().as_deref(), Some("rare"));
        assert_eq!(recording.played(), vec![Cue::Start, Cue::Pause, Cue::Select]);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_when_idle_is_silent() {
        let (app, recording) = app(60.0);
        let (was_running, _) = app.press_pause().unwrap();
        assert!(!was_running);
        assert!(recording.played().is_empty());
        assert_eq!(app.get_last_action().0.as_deref(), Some("pause"));
    }

    #[test]
    fn enabling_sound_beeps() {
        let (app, recording) = app(60.0);
        app.set_sound(false);
        app.set_sound(true);
        assert_eq!(recording.played(), vec![Cue::Beep]);
    }

    #[tokio::test(start_paused = true)]
    async fn first_command_opens_the_device_once() {
        let opened = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&opened);
        let sound = Arc::new(SoundService::new(
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(Box::new(NullOutput) as Box<dyn ToneOutput>)
            }),
            true,
        ));
        let app = AppState::new(
            TimerEngine::new(60.0),
            sound,
            0,
            "127.0.0.1".to_string(),
            None,
        );
        assert_eq!(opened.load(Ordering::SeqCst), 0);

        // Pausing an idle timer plays nothing but still opens the device
        app.press_pause().unwrap();
        assert_eq!(opened.load(Ordering::SeqCst), 1);

        app.press_start().unwrap();
        app.press_toggle().unwrap();
        app.press_reset().unwrap();
        assert_eq!(opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_plays_the_matching_cue() {
        let (app, recording) = app(1.0);
        assert_eq!(app.press_toggle().unwrap().0, ToggleOutcome::Started);
        assert_eq!(app.press_toggle().unwrap().0, ToggleOutcome::Paused);
        assert_eq!(app.press_toggle().unwrap().0, ToggleOutcome::Started);
        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        assert!(app.engine.snapshot().complete);

        // A hatched timer starts over
        let (outcome, snapshot) = app.press_toggle().unwrap();
        assert_eq!(outcome, ToggleOutcome::Started);
        assert_eq!(snapshot.remaining_seconds, 1);
        assert_eq!(
            recording.played(),
            vec![Cue::Start, Cue::Pause, Cue::Start, Cue::Start]
        );

        app.set_time(0.0).unwrap();
        assert_eq!(app.press_toggle().unwrap().0, ToggleOutcome::Refused);
        assert_eq!(recording.played().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running_is_silent() {
        let (app, recording) = app(60.0);
        assert!(app.press_start().unwrap().0);
        assert!(app.press_start().unwrap().0);
        assert_eq!(recording.played(), vec![Cue::Start]);
    }
}
