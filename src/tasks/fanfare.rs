//! Hatch fanfare task

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::{services::SoundService, state::TimerSnapshot};

/// True when `next` is the first snapshot of a completed run
pub fn completion_edge(previous: Option<&TimerSnapshot>, next: &TimerSnapshot) -> bool {
    next.complete && !previous.is_some_and(|prev| prev.complete)
}

/// Background task that diffs consecutive transitions and plays the hatch
/// fanfare once per completed countdown.
pub async fn fanfare_task(
    mut transitions: broadcast::Receiver<TimerSnapshot>,
    initial: TimerSnapshot,
    sound: Arc<SoundService>,
) {
    info!("Starting hatch fanfare task");

    let mut previous = Some(initial);

    loop {
        match transitions.recv().await {
            Ok(snapshot) => {
                if completion_edge(previous.as_ref(), &snapshot) {
                    info!("The egg hatched!");
                    sound.on_complete();
                }
                previous = Some(snapshot);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Fanfare task lagged, skipped {} transitions", skipped);
                // The next snapshot is compared against nothing rather than a stale one
                previous = None;
            }
            Err(RecvError::Closed) => {
                debug!("Transition channel closed, stopping fanfare task");
                break;
            }
        }
    }
}
