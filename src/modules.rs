//! Explicit module bootstrap.
//!
//! Every module subscribes its event handlers here, before `load` fires.
//! Registration order is load order: the delay pump lands first in the
//! tick-listener list, so delays always fire ahead of the snake within a
//! frame.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use crate::app::App;
use crate::fruits::FruitModule;
use crate::score::ScoreModule;
use crate::snake::SnakeModule;
use crate::ui::UiModule;
use crate::{delays, field, fruits, score, snake, ui};

/// Handles to the stateful modules, for the binary (which ignores them) and
/// for tests (which observe them).
pub struct Modules {
    pub fruits: Rc<RefCell<FruitModule>>,
    pub ui: Rc<RefCell<UiModule>>,
    pub score: Rc<RefCell<ScoreModule>>,
    pub snake: Rc<RefCell<SnakeModule>>,
}

/// Register every module with the application. Call once, then fire `load`.
pub fn register_all(app: &mut App, seed: u32) -> Result<Modules> {
    delays::setup(app)?;
    field::setup(app)?;
    let fruits = fruits::setup(app, seed)?;
    let ui = ui::setup(app)?;
    let score = score::setup(app)?;
    let snake = snake::setup(app)?;
    Ok(Modules {
        fruits,
        ui,
        score,
        snake,
    })
}
