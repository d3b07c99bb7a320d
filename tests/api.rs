use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use egghatch_timer::{
    api::create_router,
    services::{Cue, RecordingOutput, SoundService},
    state::{AppState, TimerEngine},
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(seed: f64) -> (Router, Arc<AppState>, RecordingOutput) {
    let recording = RecordingOutput::new();
    let sound = Arc::new(SoundService::new(recording.opener(), true));
    let state = Arc::new(AppState::new(
        TimerEngine::new(seed),
        sound,
        20560,
        "127.0.0.1".to_string(),
        None,
    ));
    (create_router(Arc::clone(&state)), state, recording)
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test(start_paused = true)]
async fn start_pause_and_status() {
    let (router, _, recording) = app(60.0);

    let (status, body) = send(&router, "POST", "/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["timer"]["running"], true);

    tokio::time::sleep(Duration::from_millis(2500)).await;

    let (_, body) = send(&router, "POST", "/pause", None).await;
    assert_eq!(body["status"], "stopped");
    assert_eq!(body["timer"]["remaining_seconds"], 58);
    assert_eq!(body["timer"]["formatted"]["display"], "00:58");

    let (_, status_body) = send(&router, "GET", "/status", None).await;
    assert_eq!(status_body["timer"]["remaining_seconds"], 58);
    assert_eq!(status_body["last_action"], "pause");
    assert_eq!(status_body["sound_enabled"], true);

    assert_eq!(recording.played(), vec![Cue::Start, Cue::Pause]);
}

#[tokio::test(start_paused = true)]
async fn set_time_is_sanitized() {
    let (router, _, _) = app(60.0);

    let (status, body) = send(&router, "POST", "/time", Some(json!({ "seconds": -3 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["remaining_seconds"], 0);
    assert_eq!(body["timer"]["initial_seconds"], 0);
    assert_eq!(body["timer"]["phase"], "empty");

    let (_, body) = send(&router, "POST", "/time", Some(json!({ "seconds": 90.7 }))).await;
    assert_eq!(body["timer"]["remaining_seconds"], 90);

    let (_, body) = send(&router, "POST", "/time", Some(json!({ "seconds": 0 }))).await;
    assert_eq!(body["timer"]["can_start"], false);
    let (_, body) = send(&router, "POST", "/start", None).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["timer"]["running"], false);
}

#[tokio::test(start_paused = true)]
async fn presets_lock_while_running() {
    let (router, _, _) = app(60.0);

    let (_, list) = send(&router, "GET", "/presets", None).await;
    assert_eq!(list.as_array().unwrap().len(), 4);
    assert_eq!(list[3]["id"], "pomodoro");
    assert_eq!(list[3]["label_time"], "25:00");

    let (status, _) = send(&router, "POST", "/presets/shiny", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&router, "POST", "/start", None).await;
    let (status, body) = send(&router, "POST", "/presets/rare", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["timer"]["initial_seconds"], 60);

    send(&router, "POST", "/pause", None).await;
    let (status, body) = send(&router, "POST", "/presets/rare", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["remaining_seconds"], 300);

    let (_, list) = send(&router, "GET", "/presets", None).await;
    assert_eq!(list[1]["selected"], true);
}

#[tokio::test(start_paused = true)]
async fn start_after_hatching_runs_again() {
    let (router, state, _) = app(2.0);

    send(&router, "POST", "/start", None).await;
    tokio::time::sleep(Duration::from_secs(3)).await;

    let (_, status_body) = send(&router, "GET", "/status", None).await;
    assert_eq!(status_body["timer"]["complete"], true);
    assert_eq!(status_body["timer"]["urgency"], "complete");

    let (_, body) = send(&router, "POST", "/start", None).await;
    assert_eq!(body["status"], "running");
    assert_eq!(body["timer"]["remaining_seconds"], 2);
    assert_eq!(body["timer"]["complete"], false);
    assert!(state.engine.is_armed());
}

#[tokio::test(start_paused = true)]
async fn toggle_and_reset() {
    let (router, _, recording) = app(10.0);

    let (_, body) = send(&router, "POST", "/toggle", None).await;
    assert_eq!(body["status"], "running");
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let (_, body) = send(&router, "POST", "/toggle", None).await;
    assert_eq!(body["status"], "stopped");
    assert_eq!(body["timer"]["remaining_seconds"], 9);

    let (_, body) = send(&router, "POST", "/reset", None).await;
    assert_eq!(body["timer"]["remaining_seconds"], 10);
    assert_eq!(body["timer"]["progress"], 0.0);

    assert_eq!(recording.played(), vec![Cue::Start, Cue::Pause, Cue::Reset]);
}

#[tokio::test]
async fn sound_toggle() {
    let (router, _, recording) = app(60.0);

    let (_, body) = send(&router, "POST", "/sound", Some(json!({ "enabled": false }))).await;
    assert_eq!(body["enabled"], false);
    send(&router, "POST", "/reset", None).await;
    assert!(recording.played().is_empty());

    let (_, body) = send(&router, "POST", "/sound", Some(json!({ "enabled": true }))).await;
    assert_eq!(body["enabled"], true);
    let (_, body) = send(&router, "GET", "/sound", None).await;
    assert_eq!(body["enabled"], true);
    assert_eq!(recording.played(), vec![Cue::Beep]);
}

#[tokio::test]
async fn health() {
    let (router, _, _) = app(60.0);
    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
