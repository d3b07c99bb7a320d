//! EggHatch Timer - a countdown that hatches an egg
//!
//! This is the main entry point for the egghatch-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use egghatch_timer::{
    api::create_router,
    config::Config,
    presets,
    services::SoundService,
    state::{sanitize_seconds, AppState, TimerEngine},
    tasks::{fanfare_task, wobble_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("egghatch_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting egghatch-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, seed={}s, audio={:?}, sound={}",
          config.host, config.port, config.seed_seconds(), config.audio,
          if config.mute { "off" } else { "on" });

    // Sound device opens on the first command (or the first cue)
    let sound = Arc::new(SoundService::from_backend(config.audio, !config.mute));
    let engine = TimerEngine::new(config.seed_seconds());

    // Feedback tasks react to engine snapshots
    tokio::spawn(wobble_task(engine.watch(), Arc::clone(&sound)));
    tokio::spawn(fanfare_task(engine.subscribe(), engine.snapshot(), Arc::clone(&sound)));

    let selected_preset = config.preset.clone().or_else(|| {
        presets::matching(sanitize_seconds(config.seed_seconds())).map(|p| p.id.to_string())
    });
    let state = Arc::new(AppState::new(
        engine,
        Arc::clone(&sound),
        config.port,
        config.host.clone(),
        selected_preset,
    ));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start        - Start (or restart after hatching)");
    info!("  POST /pause        - Pause the countdown");
    info!("  POST /toggle       - Start or pause");
    info!("  POST /reset        - Reset to the last duration set");
    info!("  POST /time         - Set duration {{\"seconds\": n}}");
    info!("  GET  /presets      - List presets");
    info!("  POST /presets/:id  - Select a preset");
    info!("  GET  /sound        - Sound setting");
    info!("  POST /sound        - Toggle sound {{\"enabled\": bool}}");
    info!("  GET  /status       - Timer snapshot and session info");
    info!("  GET  /health       - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = state.shutdown() {
        tracing::error!("Failed to shut down cleanly: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
