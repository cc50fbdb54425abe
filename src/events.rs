//! Typed event bus - the sole inter-module communication mechanism.
//!
//! Events are a closed tagged union ([`GameEvent`]) with a discriminant
//! ([`EventKind`]) used as the registry key. Subscribers are identified by an
//! explicit id per event kind; registering the same (kind, id) pair twice is
//! an error, as is removing one that was never registered.
//!
//! Delivery happens synchronously from [`crate::app::App::fire`], in
//! registration order. The subscriber list is snapshotted at fire entry, so
//! handlers are free to register, unregister and fire further events while a
//! dispatch is in flight; changes become visible to the next fire. A handler
//! must not re-enter its own closure (by firing an event it handles itself) -
//! each closure sits behind a `RefCell` and is borrowed for the duration of
//! its call.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use anyhow::Result;
use thiserror::Error;

use crate::app::App;
use crate::types::FruitKind;

/// Everything the game announces over the bus. Payloads are plain data;
/// consumers observe state but cannot reach into another module through an
/// event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Fired exactly once at startup, after all modules registered their
    /// subscriptions. One-time setup happens in `load` handlers, which
    /// receive the application by `&mut` like every handler.
    Load,
    GameStart,
    GamePause,
    GameResume,
    GameEnd,
    /// One committed grid step; carries the committed head cell, the cell
    /// collectible logic tests for pickup.
    SnakeStep { x: i32, y: i32 },
    /// A fruit was picked up at the given cell.
    FruitEaten { kind: FruitKind, x: i32, y: i32 },
}

/// Discriminant tag for event payloads, the registry key for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Load,
    GameStart,
    GamePause,
    GameResume,
    GameEnd,
    SnakeStep,
    FruitEaten,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::Load => EventKind::Load,
            GameEvent::GameStart => EventKind::GameStart,
            GameEvent::GamePause => EventKind::GamePause,
            GameEvent::GameResume => EventKind::GameResume,
            GameEvent::GameEnd => EventKind::GameEnd,
            GameEvent::SnakeStep { .. } => EventKind::SnakeStep,
            GameEvent::FruitEaten { .. } => EventKind::FruitEaten,
        }
    }
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Load => "load",
            EventKind::GameStart => "game_start",
            EventKind::GamePause => "game_pause",
            EventKind::GameResume => "game_resume",
            EventKind::GameEnd => "game_end",
            EventKind::SnakeStep => "snake_step",
            EventKind::FruitEaten => "fruit_eaten",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration failures. These signal caller-side invariant violations, not
/// runtime conditions, so callers typically propagate them as fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventBusError {
    #[error("subscriber '{id}' is already registered for '{event}'")]
    DuplicateSubscriber { event: EventKind, id: String },
    #[error("no subscribers are registered for '{event}'")]
    UnknownEvent { event: EventKind },
    #[error("subscriber '{id}' is not registered for '{event}'")]
    SubscriberNotFound { event: EventKind, id: String },
}

pub type EventHandler = Rc<RefCell<dyn FnMut(&mut App, &GameEvent) -> Result<()>>>;

struct Subscriber {
    id: String,
    handler: EventHandler,
}

/// Mapping from event kind to the ordered subscriber list. Purely a
/// registry; dispatch lives on [`App`] because handlers receive it mutably.
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<EventKind, Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber for `event`, creating the entry if absent.
    pub fn register(
        &mut self,
        event: EventKind,
        id: String,
        handler: EventHandler,
    ) -> Result<(), EventBusError> {
        let entry = self.subscribers.entry(event).or_default();
        if entry.iter().any(|s| s.id == id) {
            return Err(EventBusError::DuplicateSubscriber { event, id });
        }
        entry.push(Subscriber { id, handler });
        Ok(())
    }

    /// Remove a subscriber. Deleting the last one for an event removes the
    /// entry entirely, so a later unregister reports `UnknownEvent` rather
    /// than `SubscriberNotFound`.
    pub fn unregister(&mut self, event: EventKind, id: &str) -> Result<(), EventBusError> {
        let entry = self
            .subscribers
            .get_mut(&event)
            .ok_or(EventBusError::UnknownEvent { event })?;
        let index = entry.iter().position(|s| s.id == id).ok_or_else(|| {
            EventBusError::SubscriberNotFound {
                event,
                id: id.to_string(),
            }
        })?;
        let _ = entry.remove(index);
        if entry.is_empty() {
            let _ = self.subscribers.remove(&event);
        }
        Ok(())
    }

    /// Subscribers currently registered for `event`, in registration order.
    /// Cloned handles: mutation during dispatch cannot disturb delivery.
    pub(crate) fn snapshot(&self, event: EventKind) -> Vec<(String, EventHandler)> {
        match self.subscribers.get(&event) {
            Some(entry) => entry
                .iter()
                .map(|s| (s.id.clone(), s.handler.clone()))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn subscriber_count(&self, event: EventKind) -> usize {
        self.subscribers.get(&event).map_or(0, Vec::len)
    }
}
