//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    presets,
    state::{app_state::PresetSelection, AppState, ToggleOutcome},
};
use super::responses::{
    ApiResponse, HealthResponse, PresetEntry, SetTimeRequest, SoundSetting, StatusResponse,
};

fn internal_error(action: &str, e: String) -> StatusCode {
    error!("Failed to {}: {}", action, e);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Handle POST /start - Start the countdown (again, if it already hatched)
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let (started, snapshot) = state.press_start().map_err(|e| internal_error("start timer", e))?;

    if started {
        info!("Start endpoint called - countdown running");
        Ok(Json(ApiResponse::running(
            format!("Countdown running from {}", snapshot.formatted.display),
            snapshot,
        )))
    } else {
        Ok(Json(ApiResponse::error("No time remaining to count down".to_string(), snapshot)))
    }
}

/// Handle POST /pause - Pause the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let (was_running, snapshot) = state.press_pause().map_err(|e| internal_error("pause timer", e))?;

    let message = if was_running {
        format!("Countdown paused at {}", snapshot.formatted.display)
    } else {
        "Countdown was not running".to_string()
    };
    Ok(Json(ApiResponse::stopped(message, snapshot)))
}

/// Handle POST /toggle - Pause if running, otherwise start
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let (outcome, snapshot) = state.press_toggle().map_err(|e| internal_error("toggle timer", e))?;

    Ok(Json(match outcome {
        ToggleOutcome::Started => ApiResponse::running("Countdown started".to_string(), snapshot),
        ToggleOutcome::Paused => ApiResponse::stopped("Countdown paused".to_string(), snapshot),
        ToggleOutcome::Refused => {
            ApiResponse::error("No time remaining to count down".to_string(), snapshot)
        }
    }))
}

/// Handle POST /reset - Restore the last duration set
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let snapshot = state.press_reset().map_err(|e| internal_error("reset timer", e))?;
    Ok(Json(ApiResponse::stopped(
        format!("Countdown reset to {}", snapshot.formatted.display),
        snapshot,
    )))
}

/// Handle POST /time - Set an arbitrary duration in seconds
pub async fn set_time_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetTimeRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let snapshot = state
        .set_time(request.seconds)
        .map_err(|e| internal_error("set time", e))?;
    Ok(Json(ApiResponse::stopped(
        format!("Countdown set to {}", snapshot.formatted.display),
        snapshot,
    )))
}

/// Handle GET /presets - List the built-in presets
pub async fn presets_handler(State(state): State<Arc<AppState>>) -> Json<Vec<PresetEntry>> {
    let selected = state.get_selected_preset();
    Json(
        presets::all()
            .iter()
            .map(|preset| PresetEntry {
                preset: *preset,
                label_time: preset.label_time(),
                selected: selected.as_deref() == Some(preset.id),
            })
            .collect(),
    )
}

/// Handle POST /presets/:id - Select a preset while the timer is stopped
pub async fn select_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    let Some(preset) = presets::find(&id) else {
        info!("Unknown preset requested: {}", id);
        return Err(StatusCode::NOT_FOUND);
    };

    match state.select_preset(preset).map_err(|e| internal_error("select preset", e))? {
        PresetSelection::Applied(snapshot) => Ok((
            StatusCode::OK,
            Json(ApiResponse::stopped(
                format!("{} selected ({})", preset.label, preset.label_time()),
                snapshot,
            )),
        )),
        PresetSelection::Locked(snapshot) => Ok((
            StatusCode::CONFLICT,
            Json(ApiResponse::error(
                "Presets are locked while the countdown runs".to_string(),
                snapshot,
            )),
        )),
    }
}

/// Handle GET /sound - Report whether sound is enabled
pub async fn sound_status_handler(State(state): State<Arc<AppState>>) -> Json<SoundSetting> {
    Json(SoundSetting {
        enabled: state.sound.is_enabled(),
    })
}

/// Handle POST /sound - Enable or disable sound
pub async fn sound_handler(
    State(state): State<Arc<AppState>>,
    Json(setting): Json<SoundSetting>,
) -> Json<SoundSetting> {
    state.set_sound(setting.enabled);
    Json(SoundSetting {
        enabled: state.sound.is_enabled(),
    })
}

/// Handle GET /status - Return current timer and session status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.engine.snapshot(),
        sound_enabled: state.sound.is_enabled(),
        selected_preset: state.get_selected_preset(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
