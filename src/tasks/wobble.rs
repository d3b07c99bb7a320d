//! Egg wobble cadence task
//!
//! While the countdown runs with little time left, the egg wobbles on a
//! secondary cadence: every 500ms at `critical`, every 1500ms at `high`.
//! The cadence is re-armed whenever `running` or the urgency changes.

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    time::{interval_at, Instant},
};
use tracing::{debug, info};

use crate::{
    services::SoundService,
    state::{TimerSnapshot, Urgency},
};

pub const CRITICAL_WOBBLE: Duration = Duration::from_millis(500);
pub const HIGH_WOBBLE: Duration = Duration::from_millis(1500);

/// Wobble period for a snapshot, `None` when the egg should sit still
pub fn wobble_cadence(snapshot: &TimerSnapshot) -> Option<Duration> {
    if !snapshot.running || snapshot.complete {
        return None;
    }
    match snapshot.urgency {
        Urgency::Critical => Some(CRITICAL_WOBBLE),
        Urgency::High => Some(HIGH_WOBBLE),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cadence {
    period: Option<Duration>,
    urgency: Urgency,
}

impl Cadence {
    fn of(snapshot: &TimerSnapshot) -> Self {
        Self {
            period: wobble_cadence(snapshot),
            urgency: snapshot.urgency,
        }
    }
}

/// Background task that plays wobble cues according to the latest snapshot.
/// Exits when the engine's snapshot channel closes.
pub async fn wobble_task(mut timer_rx: watch::Receiver<TimerSnapshot>, sound: Arc<SoundService>) {
    info!("Starting wobble cadence task");

    let mut cadence = Cadence::of(&timer_rx.borrow_and_update());

    loop {
        let Some(period) = cadence.period else {
            // Disarmed: wait for the next snapshot
            if timer_rx.changed().await.is_err() {
                break;
            }
            cadence = Cadence::of(&timer_rx.borrow_and_update());
            continue;
        };

        debug!("Wobble armed every {}ms at {}", period.as_millis(), cadence.urgency);
        let mut interval = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    sound.on_wobble(cadence.urgency);
                }

                changed = timer_rx.changed() => {
                    if changed.is_err() {
                        debug!("Snapshot channel closed, stopping wobble task");
                        return;
                    }
                    let next = Cadence::of(&timer_rx.borrow_and_update());
                    if next != cadence {
                        cadence = next;
                        break;
                    }
                }
            }
        }
    }

    debug!("Wobble cadence task finished");
}
