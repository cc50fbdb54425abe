//! Delay scheduler - one-shot callbacks deferred by whole or fractional
//! seconds, measured in ticks.
//!
//! The scheduler owns the process tick counter. It advances once per
//! application frame through [`on_tick`], which the module registers as a
//! tick listener when `load` fires. A delay whose target tick has been
//! reached or passed fires exactly once and leaves the pending set; a delay
//! is removed *before* its callback runs, so cancelling from inside any
//! callback (including a sibling due in the same tick) is safe and
//! idempotent.

use anyhow::Result;
use tracing::error;

use crate::app::App;
use crate::events::{EventKind, GameEvent};

/// Handle to a pending delay, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelayId(u64);

pub type DelayCallback = Box<dyn FnOnce(&mut App) -> Result<()>>;

struct PendingDelay {
    id: DelayId,
    /// Absolute target in tick units. Kept fractional: a delay of 0.25 s at
    /// 10 ticks/s targets 2.5 and fires on the first tick at or past it.
    fires_at: f64,
    callback: DelayCallback,
}

/// Tick counter plus the pending one-shot set.
pub struct DelayScheduler {
    tickrate: u32,
    tick: u64,
    next_id: u64,
    pending: Vec<PendingDelay>,
}

impl DelayScheduler {
    pub fn new(tickrate: u32) -> Self {
        Self {
            tickrate,
            tick: 0,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Ticks elapsed since startup. Monotonic, never reset during a run.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Register a callback to fire `seconds` from now.
    pub fn schedule(&mut self, seconds: f64, callback: DelayCallback) -> DelayId {
        let id = DelayId(self.next_id);
        self.next_id += 1;
        self.pending.push(PendingDelay {
            id,
            fires_at: self.tick as f64 + seconds * self.tickrate as f64,
            callback,
        });
        id
    }

    /// Remove a pending delay so it never fires. A no-op if the delay
    /// already fired or was cancelled before.
    pub fn cancel(&mut self, id: DelayId) {
        self.pending.retain(|d| d.id != id);
    }

    /// Advance the tick counter and return the ids due this tick. The due
    /// set is fixed here: delays scheduled while firing join the pending set
    /// but wait for a later tick.
    fn begin_tick(&mut self) -> Vec<DelayId> {
        self.tick += 1;
        let now = self.tick as f64;
        self.pending
            .iter()
            .filter(|d| d.fires_at <= now)
            .map(|d| d.id)
            .collect()
    }

    /// Take a delay out of the pending set, if it is still there.
    fn take(&mut self, id: DelayId) -> Option<DelayCallback> {
        let index = self.pending.iter().position(|d| d.id == id)?;
        Some(self.pending.remove(index).callback)
    }
}

/// Per-frame pump, run as a tick listener. Fires every due delay exactly
/// once; a faulting callback is logged and does not block its siblings.
pub fn on_tick(app: &mut App) -> Result<()> {
    let due = app.delays_mut().begin_tick();
    for id in due {
        // A callback that ran earlier this tick may have cancelled this one.
        let Some(callback) = app.delays_mut().take(id) else {
            continue;
        };
        if let Err(err) = callback(app) {
            error!(tick = app.current_tick(), "delay callback failed: {err:#}");
        }
    }
    Ok(())
}

/// Announce readiness: hook the pump into the frame as soon as the
/// application loads.
pub fn setup(app: &mut App) -> Result<()> {
    app.subscribe(EventKind::Load, "delays", |app, _: &GameEvent| {
        app.register_tick_listener("delays", on_tick)?;
        Ok(())
    })?;
    Ok(())
}
