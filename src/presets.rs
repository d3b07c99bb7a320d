//! Built-in incubation presets

use serde::Serialize;

/// A selectable duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub seconds: u64,
    pub icon: &'static str,
    pub description: &'static str,
}

pub const PRESETS: [Preset; 4] = [
    Preset { id: "quick", label: "Quick Egg", seconds: 60, icon: "🥚", description: "Common" },
    Preset { id: "rare", label: "Rare Egg", seconds: 300, icon: "✨", description: "Starter" },
    Preset { id: "legendary", label: "Legendary", seconds: 600, icon: "🌟", description: "Mythical" },
    Preset { id: "pomodoro", label: "Pomodoro", seconds: 1500, icon: "🍅", description: "25 min" },
];

pub fn all() -> &'static [Preset] {
    &PRESETS
}

pub fn find(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.id == id)
}

/// Preset whose duration matches exactly, if any
pub fn matching(seconds: u64) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.seconds == seconds)
}

/// Short label time like `1:00` or `2:05` (minutes are not padded)
pub fn preset_label_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

impl Preset {
    pub fn label_time(&self) -> String {
        preset_label_time(self.seconds)
    }
}
