//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{presets::Preset, state::TimerSnapshot};

/// API response structure for timer command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// The countdown is running after the command
    pub fn running(message: String, timer: TimerSnapshot) -> Self {
        Self::new("running", message, timer)
    }

    /// The countdown is stopped after the command
    pub fn stopped(message: String, timer: TimerSnapshot) -> Self {
        Self::new("stopped", message, timer)
    }

    /// The command was refused; the snapshot is unchanged
    pub fn error(message: String, timer: TimerSnapshot) -> Self {
        Self::new("error", message, timer)
    }
}

/// Request body for POST /time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTimeRequest {
    pub seconds: f64,
}

/// Request and response body for /sound
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundSetting {
    pub enabled: bool,
}

/// One entry of GET /presets
#[derive(Debug, Clone, Serialize)]
pub struct PresetEntry {
    #[serde(flatten)]
    pub preset: Preset,
    pub label_time: String,
    pub selected: bool,
}

/// Status response with timer and session information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub sound_enabled: bool,
    pub selected_preset: Option<String>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
