//! Countdown engine: the state machine plus its single tick source
//!
//! The raw [`TimerState`] and the handle of the armed tick task share one
//! mutex. Commands and ticks apply their whole change under that lock and
//! publish the resulting snapshot before releasing it, so consumers only ever
//! see committed transitions, in order.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use serde::Serialize;
use tokio::{
    runtime::Handle,
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use super::{TickOutcome, TimerSnapshot, TimerState};
use crate::tasks::run_ticker;

/// Period of the countdown tick source
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// What `toggle` ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Started,
    Paused,
    /// Not running and nothing left to count down
    Refused,
}

/// What a start request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    Started,
    /// A countdown was already in progress; nothing changed
    AlreadyRunning,
    /// Nothing left to count down
    Refused,
}

/// Handle of the armed tick task. `epoch` lets the task recognise that it
/// has been superseded even if it already woke up before being aborted.
#[derive(Debug)]
struct Ticker {
    epoch: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
pub(crate) struct Inner {
    state: TimerState,
    ticker: Option<Ticker>,
    next_epoch: u64,
}

impl Inner {
    fn disarm(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            debug!(epoch = ticker.epoch, "Disarming tick source");
            ticker.handle.abort();
        }
    }
}

#[derive(Debug)]
pub(crate) struct Shared {
    inner: Mutex<Inner>,
    tick_period: Duration,
    /// Latest committed snapshot
    snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<TimerSnapshot>,
    /// Every committed transition, for subscribers that diff snapshots
    transition_tx: broadcast::Sender<TimerSnapshot>,
}

impl Shared {
    fn lock(&self) -> Result<MutexGuard<'_, Inner>, String> {
        self.inner
            .lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Publish the current state. Must be called with the lock held.
    fn commit(&self, inner: &Inner, action: &str) -> TimerSnapshot {
        let snapshot = TimerSnapshot::of(&inner.state);
        debug!(
            action,
            remaining = snapshot.remaining_seconds,
            running = snapshot.running,
            complete = snapshot.complete,
            "Committed timer transition"
        );

        self.snapshot_tx.send_replace(snapshot.clone());
        if self.transition_tx.send(snapshot.clone()).is_err() {
            debug!("No transition subscribers for {}", action);
        }

        snapshot
    }

    /// Apply one tick from the tick source identified by `epoch`.
    ///
    /// Ticks from a source that is no longer the armed one are ignored.
    pub(crate) fn apply_tick(&self, epoch: u64) -> Result<TickOutcome, String> {
        let mut inner = self.lock()?;

        match &inner.ticker {
            Some(ticker) if ticker.epoch == epoch => {}
            _ => return Ok(TickOutcome::Ignored),
        }

        let outcome = inner.state.tick();
        match outcome {
            TickOutcome::Counting => {
                self.commit(&inner, "tick");
            }
            TickOutcome::Completed => {
                // The calling task exits on its own; dropping the handle detaches it
                inner.ticker = None;
                self.commit(&inner, "complete");
            }
            TickOutcome::Ignored => {
                warn!("Tick source armed while timer not running, disarming");
                inner.disarm();
            }
        }

        Ok(outcome)
    }
}

/// Single-instance countdown engine
#[derive(Debug)]
pub struct TimerEngine {
    shared: Arc<Shared>,
}

impl TimerEngine {
    /// Create an idle engine seeded with `seed_seconds` (sanitized)
    pub fn new(seed_seconds: f64) -> Self {
        Self::with_tick_period(seed_seconds, TICK_PERIOD)
    }

    /// Create an engine with a custom tick period
    pub fn with_tick_period(seed_seconds: f64, tick_period: Duration) -> Self {
        let state = TimerState::new(seed_seconds);
        let (snapshot_tx, snapshot_rx) = watch::channel(TimerSnapshot::of(&state));
        let (transition_tx, _) = broadcast::channel(100);

        info!("Timer engine created with {}s", state.initial_seconds);

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state,
                    ticker: None,
                    next_epoch: 0,
                }),
                tick_period,
                snapshot_tx,
                _snapshot_rx: snapshot_rx,
                transition_tx,
            }),
        }
    }

    /// Latest committed snapshot
    pub fn snapshot(&self) -> TimerSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Copy of the raw state
    pub fn state(&self) -> Result<TimerState, String> {
        self.shared.lock().map(|inner| inner.state)
    }

    /// Receive every committed transition from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TimerSnapshot> {
        self.shared.transition_tx.subscribe()
    }

    /// Watch the latest snapshot
    pub fn watch(&self) -> watch::Receiver<TimerSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Whether a tick source is currently armed
    pub fn is_armed(&self) -> bool {
        self.shared
            .lock()
            .map(|inner| inner.ticker.is_some())
            .unwrap_or(false)
    }

    /// Replace the duration. Allowed in any state; stops a running countdown.
    pub fn set_time(&self, seconds: f64) -> Result<TimerSnapshot, String> {
        let mut inner = self.shared.lock()?;
        inner.disarm();
        let sanitized = inner.state.set_time(seconds);
        info!("Timer set to {}s", sanitized);
        Ok(self.shared.commit(&inner, "set-time"))
    }

    /// Start counting down. Returns `false` when no time remains.
    ///
    /// Calling this while already running is a no-op; it never arms a
    /// second tick source.
    pub fn start(&self) -> Result<bool, String> {
        let mut inner = self.shared.lock()?;
        let outcome = self.start_locked(&mut inner)?;
        Ok(outcome != StartOutcome::Refused)
    }

    /// Start counting down, first restoring the initial duration if the
    /// last run hatched.
    pub fn start_fresh(&self) -> Result<StartOutcome, String> {
        let mut inner = self.shared.lock()?;
        self.restart_completed(&mut inner);
        self.start_locked(&mut inner)
    }

    /// Stop counting. Returns whether the timer was running.
    pub fn pause(&self) -> Result<bool, String> {
        let mut inner = self.shared.lock()?;
        Ok(self.pause_locked(&mut inner))
    }

    /// Restore the last duration set, clearing completion
    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        let mut inner = self.shared.lock()?;
        inner.disarm();
        inner.state.reset();
        info!("Timer reset to {}s", inner.state.initial_seconds);
        Ok(self.shared.commit(&inner, "reset"))
    }

    /// Pause if running, otherwise start
    pub fn toggle(&self) -> Result<ToggleOutcome, String> {
        let mut inner = self.shared.lock()?;
        self.toggle_locked(&mut inner)
    }

    /// Like [`toggle`](Self::toggle), but a hatched timer is restored to its
    /// initial duration and started again.
    pub fn toggle_fresh(&self) -> Result<ToggleOutcome, String> {
        let mut inner = self.shared.lock()?;
        if !inner.state.running {
            self.restart_completed(&mut inner);
        }
        self.toggle_locked(&mut inner)
    }

    /// Release the tick source and stop counting. Used when the owning
    /// session ends.
    pub fn shutdown(&self) -> Result<(), String> {
        let mut inner = self.shared.lock()?;
        inner.disarm();
        if inner.state.halt() {
            self.shared.commit(&inner, "shutdown");
        }
        info!("Timer engine shut down");
        Ok(())
    }

    fn start_locked(&self, inner: &mut Inner) -> Result<StartOutcome, String> {
        if inner.state.running && inner.ticker.is_some() {
            debug!("Start requested while running, ignoring");
            return Ok(StartOutcome::AlreadyRunning);
        }
        if !inner.state.can_start() {
            info!("Start refused: no time remaining");
            return Ok(StartOutcome::Refused);
        }

        let runtime = Handle::try_current()
            .map_err(|e| format!("Cannot arm tick source outside a tokio runtime: {}", e))?;

        inner.disarm();
        inner.state.begin();

        let epoch = inner.next_epoch;
        inner.next_epoch += 1;
        let handle = runtime.spawn(run_ticker(
            Arc::downgrade(&self.shared),
            epoch,
            self.shared.tick_period,
        ));
        inner.ticker = Some(Ticker { epoch, handle });

        info!("Timer started with {}s remaining", inner.state.remaining_seconds);
        self.shared.commit(inner, "start");
        Ok(StartOutcome::Started)
    }

    fn pause_locked(&self, inner: &mut Inner) -> bool {
        inner.disarm();

        if !inner.state.halt() {
            debug!("Pause requested while not running, ignoring");
            return false;
        }

        info!("Timer paused with {}s remaining", inner.state.remaining_seconds);
        self.shared.commit(inner, "pause");
        true
    }

    fn toggle_locked(&self, inner: &mut Inner) -> Result<ToggleOutcome, String> {
        if inner.state.running {
            self.pause_locked(inner);
            return Ok(ToggleOutcome::Paused);
        }
        match self.start_locked(inner)? {
            StartOutcome::Refused => Ok(ToggleOutcome::Refused),
            _ => Ok(ToggleOutcome::Started),
        }
    }

    fn restart_completed(&self, inner: &mut Inner) {
        if inner.state.complete {
            inner.disarm();
            inner.state.reset();
            info!("Timer hatched, restarting from {}s", inner.state.initial_seconds);
            self.shared.commit(inner, "reset");
        }
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.shared.inner.lock() {
            inner.disarm();
            if inner.state.halt() {
                self.shared.commit(&inner, "drop");
            }
        }
    }
}
