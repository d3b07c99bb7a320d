//! Countdown tick source

use std::{sync::Weak, time::Duration};
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info};

use crate::state::{timer_engine::Shared, TickOutcome};

/// Tick the engine once per `period` until the countdown completes, the
/// source is superseded, or the engine is dropped.
///
/// Spawned and aborted only by `TimerEngine`; the first tick lands one full
/// period after arming.
pub(crate) async fn run_ticker(shared: Weak<Shared>, epoch: u64, period: Duration) {
    debug!(epoch, "Tick source armed");

    let mut interval = interval_at(Instant::now() + period, period);

    loop {
        interval.tick().await;

        let Some(shared) = shared.upgrade() else {
            debug!(epoch, "Engine gone, tick source exiting");
            break;
        };

        match shared.apply_tick(epoch) {
            Ok(TickOutcome::Counting) => {}
            Ok(TickOutcome::Completed) => {
                info!("Countdown complete");
                break;
            }
            Ok(TickOutcome::Ignored) => {
                debug!(epoch, "Tick source superseded, exiting");
                break;
            }
            Err(e) => {
                error!("Failed to apply tick: {}", e);
                break;
            }
        }
    }
}
