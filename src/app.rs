//! Application loop state: listener/handler/drawer registries, event
//! dispatch, and the per-frame phases.
//!
//! One [`App`] value owns everything that was ambient in earlier designs -
//! the event bus, the delay scheduler (and with it the tick counter) and the
//! registries - and is passed `&mut` into every callback. Frame order is
//! fixed: input dispatch, then tick listeners in registration order, then
//! drawers in layer order. The rhythm itself (polling, sleeping) lives in the
//! binary; this type only advances when told to.
//!
//! All registries snapshot before invoking, so callbacks may re-register
//! themselves or others mid-dispatch; the change applies from the next
//! dispatch on. A faulting callback is logged and isolated - siblings still
//! run and the frame completes.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use crossterm::event::{KeyEvent, KeyEventKind};
use thiserror::Error;
use tracing::{error, warn};

use crate::delays::{DelayCallback, DelayId, DelayScheduler};
use crate::events::{EventBus, EventBusError, EventHandler, EventKind, GameEvent};
use crate::term::fb::FrameBuffer;
use crate::types::GameConfig;

/// Input event classes handlers can register for. Terminal auto-repeat is
/// dropped at dispatch, matching press/release-only handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    KeyPress,
    KeyRelease,
}

impl InputKind {
    fn from_event(kind: KeyEventKind) -> Option<Self> {
        match kind {
            KeyEventKind::Press => Some(InputKind::KeyPress),
            KeyEventKind::Release => Some(InputKind::KeyRelease),
            KeyEventKind::Repeat => None,
        }
    }
}

/// Failures from the identity-based registries. Like [`EventBusError`],
/// these indicate a caller bug and are surfaced, not recovered from.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("'{id}' is already registered in the {registry} registry")]
    Duplicate { registry: &'static str, id: String },
    #[error("'{id}' is not registered in the {registry} registry")]
    NotFound { registry: &'static str, id: String },
    #[error("unknown draw layer '{layer}'")]
    UnknownLayer { layer: String },
}

type TickListener = Rc<RefCell<dyn FnMut(&mut App) -> Result<()>>>;
type InputHandler = Rc<RefCell<dyn FnMut(&mut App, &KeyEvent) -> Result<()>>>;
type Drawer = Rc<RefCell<dyn FnMut(&mut FrameBuffer)>>;

struct DrawerEntry {
    layer_index: usize,
    layer: String,
    id: String,
    drawer: Drawer,
}

/// The application: registries, bus, scheduler and run flag.
pub struct App {
    config: GameConfig,
    events: EventBus,
    delays: DelayScheduler,
    tick_listeners: Vec<(String, TickListener)>,
    key_press_handlers: Vec<(String, InputHandler)>,
    key_release_handlers: Vec<(String, InputHandler)>,
    /// Kept sorted by `layer_index`, stable within a layer.
    drawers: Vec<DrawerEntry>,
    render_order: Vec<String>,
    running: bool,
}

impl App {
    /// Build an application with the given configuration and the bottom-to-
    /// top draw layer order drawers may register against.
    pub fn new(config: GameConfig, render_order: &[&str]) -> Self {
        Self {
            config,
            events: EventBus::new(),
            delays: DelayScheduler::new(config.tickrate),
            tick_listeners: Vec::new(),
            key_press_handlers: Vec::new(),
            key_release_handlers: Vec::new(),
            drawers: Vec::new(),
            render_order: render_order.iter().map(|s| s.to_string()).collect(),
            running: true,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn running(&self) -> bool {
        self.running
    }

    /// Ask the loop to stop after the current frame.
    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn current_tick(&self) -> u64 {
        self.delays.current_tick()
    }

    pub(crate) fn delays_mut(&mut self) -> &mut DelayScheduler {
        &mut self.delays
    }

    // -- Event bus ---------------------------------------------------------

    /// Subscribe `handler` under `id` for one event kind.
    pub fn subscribe<F>(
        &mut self,
        event: EventKind,
        id: impl Into<String>,
        handler: F,
    ) -> Result<(), EventBusError>
    where
        F: FnMut(&mut App, &GameEvent) -> Result<()> + 'static,
    {
        self.events
            .register(event, id.into(), Rc::new(RefCell::new(handler)))
    }

    pub fn unsubscribe(&mut self, event: EventKind, id: &str) -> Result<(), EventBusError> {
        self.events.unregister(event, id)
    }

    /// Deliver `event` to every subscriber registered at this moment, in
    /// registration order. Firing with no subscribers is a no-op. A failing
    /// subscriber is logged and skipped over; delivery continues and a
    /// single aggregate diagnostic follows if anything failed.
    pub fn fire(&mut self, event: GameEvent) {
        let kind = event.kind();
        let subscribers = self.events.snapshot(kind);
        let mut faults = 0usize;
        for (id, handler) in subscribers {
            if let Err(err) = invoke_event_handler(&handler, self, &event) {
                faults += 1;
                error!(event = kind.as_str(), subscriber = %id, "event handler failed: {err:#}");
            }
        }
        if faults > 0 {
            warn!(
                event = kind.as_str(),
                "{faults} subscriber fault(s) while dispatching '{kind}'"
            );
        }
    }

    // -- Delays ------------------------------------------------------------

    /// Schedule a one-shot callback `seconds` from now (tick-quantized).
    pub fn schedule<F>(&mut self, seconds: f64, callback: F) -> DelayId
    where
        F: FnOnce(&mut App) -> Result<()> + 'static,
    {
        let callback: DelayCallback = Box::new(callback);
        self.delays.schedule(seconds, callback)
    }

    /// Cancel a pending delay. No-op if it already fired.
    pub fn cancel_delay(&mut self, id: DelayId) {
        self.delays.cancel(id);
    }

    // -- Tick listeners ----------------------------------------------------

    pub fn register_tick_listener<F>(
        &mut self,
        id: impl Into<String>,
        listener: F,
    ) -> Result<(), RegistryError>
    where
        F: FnMut(&mut App) -> Result<()> + 'static,
    {
        let id = id.into();
        if self.tick_listeners.iter().any(|(i, _)| *i == id) {
            return Err(RegistryError::Duplicate {
                registry: "tick listener",
                id,
            });
        }
        self.tick_listeners
            .push((id, Rc::new(RefCell::new(listener))));
        Ok(())
    }

    pub fn unregister_tick_listener(&mut self, id: &str) -> Result<(), RegistryError> {
        let index = self
            .tick_listeners
            .iter()
            .position(|(i, _)| i == id)
            .ok_or_else(|| RegistryError::NotFound {
                registry: "tick listener",
                id: id.to_string(),
            })?;
        let _ = self.tick_listeners.remove(index);
        Ok(())
    }

    /// Run one simulation step: every tick listener once, in registration
    /// order, with per-listener fault isolation.
    pub fn step(&mut self) {
        let listeners: Vec<(String, TickListener)> = self
            .tick_listeners
            .iter()
            .map(|(id, l)| (id.clone(), l.clone()))
            .collect();
        let mut faults = 0usize;
        for (id, listener) in listeners {
            if let Err(err) = invoke_tick_listener(&listener, self) {
                faults += 1;
                error!(listener = %id, "tick listener failed: {err:#}");
            }
        }
        if faults > 0 {
            warn!(
                tick = self.current_tick(),
                "{faults} tick listener fault(s) this frame"
            );
        }
    }

    // -- Input handlers ----------------------------------------------------

    pub fn register_input_handler<F>(
        &mut self,
        kind: InputKind,
        id: impl Into<String>,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: FnMut(&mut App, &KeyEvent) -> Result<()> + 'static,
    {
        let id = id.into();
        let handlers = self.input_registry(kind);
        if handlers.iter().any(|(i, _)| *i == id) {
            return Err(RegistryError::Duplicate {
                registry: "input handler",
                id,
            });
        }
        handlers.push((id, Rc::new(RefCell::new(handler))));
        Ok(())
    }

    pub fn unregister_input_handler(
        &mut self,
        kind: InputKind,
        id: &str,
    ) -> Result<(), RegistryError> {
        let handlers = self.input_registry(kind);
        let index = handlers.iter().position(|(i, _)| i == id).ok_or_else(|| {
            RegistryError::NotFound {
                registry: "input handler",
                id: id.to_string(),
            }
        })?;
        let _ = handlers.remove(index);
        Ok(())
    }

    fn input_registry(&mut self, kind: InputKind) -> &mut Vec<(String, InputHandler)> {
        match kind {
            InputKind::KeyPress => &mut self.key_press_handlers,
            InputKind::KeyRelease => &mut self.key_release_handlers,
        }
    }

    /// Route one key event to the handlers registered for its class, in
    /// registration order. Auto-repeat events are dropped here.
    pub fn dispatch_input(&mut self, key: &KeyEvent) {
        let Some(kind) = InputKind::from_event(key.kind) else {
            return;
        };
        let handlers: Vec<(String, InputHandler)> = self
            .input_registry(kind)
            .iter()
            .map(|(id, h)| (id.clone(), h.clone()))
            .collect();
        let mut faults = 0usize;
        for (id, handler) in handlers {
            if let Err(err) = invoke_input_handler(&handler, self, key) {
                faults += 1;
                error!(handler = %id, "input handler failed: {err:#}");
            }
        }
        if faults > 0 {
            warn!("{faults} input handler fault(s) while dispatching a key event");
        }
    }

    // -- Drawers -----------------------------------------------------------

    /// Register a draw callback on a layer. Layer order comes from the
    /// render-order list given at construction; within a layer, drawers keep
    /// registration order.
    pub fn register_drawer<F>(
        &mut self,
        layer: &str,
        id: impl Into<String>,
        drawer: F,
    ) -> Result<(), RegistryError>
    where
        F: FnMut(&mut FrameBuffer) + 'static,
    {
        let id = id.into();
        let layer_index = self
            .render_order
            .iter()
            .position(|l| l == layer)
            .ok_or_else(|| RegistryError::UnknownLayer {
                layer: layer.to_string(),
            })?;
        if self
            .drawers
            .iter()
            .any(|d| d.layer == layer && d.id == id)
        {
            return Err(RegistryError::Duplicate {
                registry: "drawer",
                id,
            });
        }
        let insert_at = self
            .drawers
            .iter()
            .position(|d| d.layer_index > layer_index)
            .unwrap_or(self.drawers.len());
        self.drawers.insert(
            insert_at,
            DrawerEntry {
                layer_index,
                layer: layer.to_string(),
                id,
                drawer: Rc::new(RefCell::new(drawer)),
            },
        );
        Ok(())
    }

    pub fn unregister_drawer(&mut self, layer: &str, id: &str) -> Result<(), RegistryError> {
        let index = self
            .drawers
            .iter()
            .position(|d| d.layer == layer && d.id == id)
            .ok_or_else(|| RegistryError::NotFound {
                registry: "drawer",
                id: format!("{layer}/{id}"),
            })?;
        let _ = self.drawers.remove(index);
        Ok(())
    }

    /// Invoke every drawer in layer order against the framebuffer.
    pub fn draw(&self, fb: &mut FrameBuffer) {
        for entry in &self.drawers {
            (&mut *entry.drawer.borrow_mut())(fb);
        }
    }
}

fn invoke_event_handler(handler: &EventHandler, app: &mut App, event: &GameEvent) -> Result<()> {
    (&mut *handler.borrow_mut())(app, event)
}

fn invoke_tick_listener(listener: &TickListener, app: &mut App) -> Result<()> {
    (&mut *listener.borrow_mut())(app)
}

fn invoke_input_handler(handler: &InputHandler, app: &mut App, key: &KeyEvent) -> Result<()> {
    (&mut *handler.borrow_mut())(app, key)
}
