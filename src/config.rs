//! Configuration and CLI argument handling

use clap::Parser;

use crate::{presets, services::AudioBackend};

fn parse_preset_id(id: &str) -> Result<String, String> {
    match presets::find(id) {
        Some(preset) => Ok(preset.id.to_string()),
        None => {
            let known: Vec<&str> = presets::all().iter().map(|p| p.id).collect();
            Err(format!("unknown preset '{}' (expected one of: {})", id, known.join(", ")))
        }
    }
}

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "egghatch-timer")]
#[command(about = "A countdown timer that hatches an egg, controlled over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20560")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Initial countdown in seconds (fractions are floored, negatives become 0)
    #[arg(short, long, default_value = "60", allow_negative_numbers = true)]
    pub seconds: f64,

    /// Start from a built-in preset instead of --seconds
    #[arg(long, value_parser = parse_preset_id)]
    pub preset: Option<String>,

    /// Start with sound disabled
    #[arg(short, long)]
    pub mute: bool,

    /// Where sound cues go
    #[arg(long, value_enum, default_value = "log")]
    pub audio: AudioBackend,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Seed duration: the preset's if one was chosen, otherwise --seconds
    pub fn seed_seconds(&self) -> f64 {
        self.preset
            .as_deref()
            .and_then(presets::find)
            .map(|preset| preset.seconds as f64)
            .unwrap_or(self.seconds)
    }
}
